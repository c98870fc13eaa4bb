use rand::Rng;
use rand_xoshiro::Xoshiro256StarStar;

use super::metropolis::accept;
use super::schedule::Schedule;
use crate::error::Result;
use crate::geometry::{Lattice, Position};
use crate::spins;

/// Single-spin-flip Metropolis engine over one private lattice.
///
/// The engine keeps two running aggregates, the number of up spins and the
/// total energy, which are updated on every accepted flip and always agree
/// with a full recount of the lattice (the energy within rounding, and only
/// while the field is held constant).
///
/// Temperature and field are [`Schedule`]s and are re-read on every attempt.
pub struct IsingEngine {
    lattice: Lattice,
    temperature: Schedule,
    field: Schedule,
    rng: Xoshiro256StarStar,
    micro_samples: usize,
    positive_spins: usize,
    total_energy: f64,
    energies: Vec<f64>,
    magnetizations: Vec<f64>,
    last_step_flips: usize,
    last_step_attempts: usize,
}

impl IsingEngine {
    /// Wrap an already-filled lattice. Aggregates are seeded from a full
    /// recount using the field's current value.
    pub fn new(
        lattice: Lattice,
        temperature: impl Into<Schedule>,
        field: impl Into<Schedule>,
        micro_samples: usize,
        rng: Xoshiro256StarStar,
    ) -> Self {
        let field = field.into();
        let positive_spins = lattice.positive_spin_count();
        let total_energy = spins::compute_energy(&lattice, field.current());
        Self {
            lattice,
            temperature: temperature.into(),
            field,
            rng,
            micro_samples,
            positive_spins,
            total_energy,
            energies: Vec::with_capacity(micro_samples),
            magnetizations: Vec::with_capacity(micro_samples),
            last_step_flips: 0,
            last_step_attempts: 0,
        }
    }

    /// Lattice of independent fair coin flips drawn from the engine's own RNG.
    /// Fails if `extent` is not a valid lattice extent.
    pub fn with_random_spins(
        extent: Position,
        temperature: impl Into<Schedule>,
        field: impl Into<Schedule>,
        micro_samples: usize,
        mut rng: Xoshiro256StarStar,
    ) -> Result<Self> {
        let lattice = Lattice::new(extent, |_| rng.gen::<bool>())?;
        Ok(Self::new(lattice, temperature, field, micro_samples, rng))
    }

    /// Perform exactly `n` Metropolis attempts.
    ///
    /// The micro-sample series are cleared and refilled with
    /// `micro_samples` entries; sample `j` is taken once
    /// `(j + 1) * n / micro_samples` attempts (floor) have been made, so the
    /// last sample always lands on attempt `n`. `advance(0)` leaves the engine
    /// untouched.
    pub fn advance(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.energies.clear();
        self.magnetizations.clear();
        self.last_step_flips = 0;
        self.last_step_attempts = n;

        let m = self.micro_samples;
        let mut done = 0usize;
        for j in 0..m {
            let boundary = (j + 1) * n / m;
            while done < boundary {
                self.attempt();
                done += 1;
            }
            self.record_sample();
        }
        while done < n {
            self.attempt();
            done += 1;
        }
    }

    #[inline]
    fn attempt(&mut self) {
        let pos = self.random_position();
        let index = self.lattice.index_of(pos);
        let delta = spins::candidate_energy(&self.lattice, index, self.field.current());
        if accept(&mut self.rng, delta, self.temperature.current()) {
            self.flip(index, delta);
        }
    }

    #[inline]
    fn random_position(&mut self) -> Position {
        let rng = &mut self.rng;
        self.lattice
            .extent()
            .map_coordinates(|_, extent| rng.gen_range(0..extent))
    }

    /// Apply an accepted flip of site `index` whose candidate term was
    /// `delta`.
    #[inline]
    fn flip(&mut self, index: usize, delta: f64) {
        if self.lattice.toggle_index(index) {
            self.positive_spins += 1;
        } else {
            self.positive_spins -= 1;
        }
        self.total_energy -= 2.0 * delta;
        self.last_step_flips += 1;
    }

    fn record_sample(&mut self) {
        self.energies.push(self.energy());
        self.magnetizations.push(self.magnetization());
    }

    /// `2 * N_up / N - 1`, in `[-1, 1]`.
    pub fn magnetization(&self) -> f64 {
        2.0 * self.positive_spins as f64 / self.lattice.volume() as f64 - 1.0
    }

    /// Energy per site.
    pub fn energy(&self) -> f64 {
        self.total_energy / self.lattice.volume() as f64
    }

    pub fn total_energy(&self) -> f64 {
        self.total_energy
    }

    pub fn positive_spin_count(&self) -> usize {
        self.positive_spins
    }

    /// Full-lattice energy at the field's current value, bypassing the
    /// running aggregate.
    pub fn recompute_energy(&self) -> f64 {
        spins::compute_energy(&self.lattice, self.field.current())
    }

    pub fn volume(&self) -> usize {
        self.lattice.volume()
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.current()
    }

    pub fn field(&self) -> f64 {
        self.field.current()
    }

    /// Per-site energies sampled during the last `advance`.
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// Magnetizations sampled during the last `advance`.
    pub fn magnetizations(&self) -> &[f64] {
        &self.magnetizations
    }

    pub fn last_step_flips(&self) -> usize {
        self.last_step_flips
    }

    /// Accepted flips per attempt over the last `advance`.
    pub fn flip_rate(&self) -> f64 {
        if self.last_step_attempts == 0 {
            return 0.0;
        }
        self.last_step_flips as f64 / self.last_step_attempts as f64
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Deep copy of the live lattice, safe to hand to another thread.
    pub fn snapshot(&self) -> Lattice {
        self.lattice.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(seed)
    }

    fn random_engine(edge: i64, temp: f64, field: f64, seed: u64) -> IsingEngine {
        IsingEngine::with_random_spins(Position::new(edge, edge), temp, field, 10, rng(seed)).unwrap()
    }

    fn assert_consistent(engine: &IsingEngine) {
        assert_eq!(
            engine.positive_spin_count(),
            engine.lattice().positive_spin_count()
        );
        let full = engine.recompute_energy();
        assert!(
            (engine.total_energy() - full).abs() < 1e-6,
            "incremental {} vs recomputed {full}",
            engine.total_energy()
        );
    }

    #[test]
    fn test_aggregates_match_recount() {
        for (temp, field) in [(0.5, 0.0), (2.27, 0.1), (10.0, -0.7)] {
            let mut engine = random_engine(12, temp, field, 3);
            assert_consistent(&engine);
            for n in [1, 17, 144, 1000, 5000] {
                engine.advance(n);
                assert_consistent(&engine);
            }
        }
    }

    #[test]
    fn test_magnetization_bounds() {
        let extent = Position::new(4, 4);
        let up = IsingEngine::new(Lattice::uniform(extent, true).unwrap(), 1.0, 0.0, 1, rng(0));
        assert_eq!(up.magnetization(), 1.0);
        let down = IsingEngine::new(Lattice::uniform(extent, false).unwrap(), 1.0, 0.0, 1, rng(0));
        assert_eq!(down.magnetization(), -1.0);

        let mut engine = random_engine(8, 3.0, 0.2, 11);
        for _ in 0..20 {
            engine.advance(256);
            assert!((-1.0..=1.0).contains(&engine.magnetization()));
            for &m in engine.magnetizations() {
                assert!((-1.0..=1.0).contains(&m));
            }
        }
    }

    #[test]
    fn test_advance_zero_is_noop() {
        let mut engine = random_engine(6, 2.0, 0.0, 5);
        engine.advance(100);
        let lattice = engine.snapshot();
        let spins = engine.positive_spin_count();
        let energy = engine.total_energy();
        let energies = engine.energies().to_vec();
        let mags = engine.magnetizations().to_vec();
        let flips = engine.last_step_flips();

        engine.advance(0);

        assert_eq!(engine.lattice(), &lattice);
        assert_eq!(engine.positive_spin_count(), spins);
        assert_eq!(engine.total_energy(), energy);
        assert_eq!(engine.energies(), energies.as_slice());
        assert_eq!(engine.magnetizations(), mags.as_slice());
        assert_eq!(engine.last_step_flips(), flips);
    }

    #[test]
    fn test_flips_bounded_by_attempts() {
        // At huge temperature nearly every attempt flips, but never more.
        let mut engine = random_engine(5, 1e9, 0.0, 9);
        for n in [1, 7, 50, 333] {
            engine.advance(n);
            assert!(engine.last_step_flips() <= n);
            assert!(engine.flip_rate() <= 1.0);
        }
    }

    #[test]
    fn test_micro_samples_even_division() {
        let mut engine = random_engine(8, 2.0, 0.0, 1);
        engine.advance(1000);
        assert_eq!(engine.energies().len(), 10);
        assert_eq!(engine.magnetizations().len(), 10);
        // Final sample reflects the post-advance state.
        assert_eq!(*engine.energies().last().unwrap(), engine.energy());
        assert_eq!(
            *engine.magnetizations().last().unwrap(),
            engine.magnetization()
        );
    }

    #[test]
    fn test_micro_samples_uneven_division() {
        let mut engine = random_engine(8, 2.0, 0.0, 1);
        engine.advance(37);
        assert_eq!(engine.energies().len(), 10);
        // Fewer attempts than samples still yields exactly one sample each.
        engine.advance(3);
        assert_eq!(engine.magnetizations().len(), 10);
        assert_eq!(
            *engine.magnetizations().last().unwrap(),
            engine.magnetization()
        );

        let mut silent =
            IsingEngine::with_random_spins(Position::new(4, 4), 2.0, 0.0, 0, rng(2)).unwrap();
        silent.advance(50);
        assert!(silent.energies().is_empty());
        assert_consistent(&silent);
    }

    #[test]
    fn test_high_temperature_accepts_almost_everything() {
        let mut engine = random_engine(16, 1e6, 0.0, 21);
        engine.advance(20_000);
        assert!(engine.flip_rate() > 0.99, "rate {}", engine.flip_rate());
    }

    #[test]
    fn test_low_temperature_only_uphill_flips() {
        // All up at T = 0.01: every candidate term is -4, accepted with
        // probability exp(-800).
        let extent = Position::new(4, 4);
        let frozen = Lattice::uniform(extent, true).unwrap();
        let mut engine = IsingEngine::new(frozen.clone(), 0.01, 0.0, 1, rng(4));
        engine.advance(10_000);
        assert_eq!(engine.last_step_flips(), 0);
        assert_eq!(engine.lattice(), &frozen);
        assert_eq!(engine.magnetization(), 1.0);
    }

    #[test]
    fn test_all_up_candidate_is_minus_four() {
        let engine = IsingEngine::new(
            Lattice::uniform(Position::new(4, 4), true).unwrap(),
            0.01,
            0.0,
            1,
            rng(8),
        );
        for pos in engine.lattice().positions() {
            let index = engine.lattice().index_of(pos);
            assert_eq!(spins::candidate_energy(engine.lattice(), index, 0.0), -4.0);
        }
    }

    #[test]
    fn test_forced_flip_on_two_by_two() {
        // [[up, up], [down, up]]: the down cell is (1, 0).
        let lattice =
            Lattice::new(Position::new(2, 2), |p| !(p.x() == 1 && p.y() == 0)).unwrap();
        let mut engine = IsingEngine::new(lattice, 1.0, 0.0, 1, rng(0));
        let before = engine.recompute_energy();
        assert_eq!(engine.total_energy(), before);

        let index = engine.lattice().index_of(Position::new(1, 0));
        let delta = spins::candidate_energy(engine.lattice(), index, 0.0);
        engine.flip(index, delta);

        let after = engine.recompute_energy();
        assert_eq!(after - before, -2.0 * delta);
        assert_eq!(engine.total_energy(), after);
        assert_eq!(engine.positive_spin_count(), 4);
        assert_eq!(engine.last_step_flips(), 1);
    }

    #[test]
    fn test_field_is_read_every_attempt() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);
        let field = Schedule::varying(move || {
            counter.fetch_add(1, Ordering::Relaxed);
            0.0
        });
        let mut engine =
            IsingEngine::with_random_spins(Position::new(4, 4), 2.0, field, 1, rng(6)).unwrap();
        let seeded = reads.load(Ordering::Relaxed);
        engine.advance(250);
        assert_eq!(reads.load(Ordering::Relaxed) - seeded, 250);
    }

    #[test]
    fn test_strong_field_aligns_spins() {
        let mut engine = random_engine(10, 1.0, 3.0, 12);
        for _ in 0..20 {
            engine.advance(1000);
        }
        assert!(engine.magnetization() > 0.9);
        assert_consistent(&engine);
    }
}
