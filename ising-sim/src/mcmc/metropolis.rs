use rand::Rng;

/// Metropolis acceptance for a candidate with energy term `delta` at
/// temperature `temp`.
///
/// `delta > 0` is always accepted without touching the RNG. Otherwise the flip
/// is accepted with probability `exp(2 * delta / temp)`, evaluated in log form
/// as `delta > (temp / 2) * ln(u)`. `temp` must be strictly positive.
#[inline]
pub fn accept<R: Rng + ?Sized>(rng: &mut R, delta: f64, temp: f64) -> bool {
    if delta > 0.0 {
        return true;
    }
    delta > (temp / 2.0) * rng.gen::<f64>().ln()
}

/// Closed-form acceptance probability, `min(1, exp(2 * delta / temp))`.
#[inline]
pub fn acceptance_probability(delta: f64, temp: f64) -> f64 {
    if delta > 0.0 {
        1.0
    } else {
        (2.0 * delta / temp).exp()
    }
}
