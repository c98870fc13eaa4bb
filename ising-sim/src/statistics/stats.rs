/// Running first and second moments of a scalar series.
#[derive(Debug, Clone, Default)]
pub struct Moments {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    pub fn from_slice(values: &[f64]) -> Self {
        let mut m = Self::default();
        for &v in values {
            m.update(v);
        }
        m
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean; `NaN` for an empty series.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum / self.count as f64
    }

    /// Sample standard deviation (Bessel-corrected); zero below two samples.
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        ((self.sum_sq - n * mean * mean) / (n - 1.0)).max(0.0).sqrt()
    }
}
