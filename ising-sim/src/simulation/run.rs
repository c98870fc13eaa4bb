use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{error, info};

use super::probe::LivenessProbe;
use crate::config::Settings;
use crate::error::Result;
use crate::export::Exporter;
use crate::mcmc::IsingEngine;
use crate::recorder::{Recorder, RunTable, Value};
use crate::statistics::RunOutcome;

pub const COL_ATTEMPT_DENSITY: &str = "Iterations Density";
pub const COL_TEMPERATURE: &str = "Temperature";
pub const COL_FIELD: &str = "Magnetic Tension";
pub const COL_MAGNETIZATION: &str = "Magnetization";
pub const COL_ENERGY: &str = "Total Energy";
pub const COL_FLIP_RATE: &str = "Flips per iteration";

/// Sweep coordinates of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParams {
    pub index: usize,
    pub temperature: f64,
    pub field: f64,
}

/// One simulation in a batch: an engine driven for a fixed number of
/// macro-steps, recording observables after each.
///
/// Each macro-step is `advance`, then record, then decide whether to go on,
/// so the terminal step is recorded exactly once like every other.
pub struct BatchRun {
    params: RunParams,
    engine: IsingEngine,
    attempts_per_step: usize,
    max_steps: usize,
    steps: usize,
    table: RunTable,
    probe: LivenessProbe,
}

impl BatchRun {
    /// # Panics
    ///
    /// If `attempts_per_step` or `max_steps` is zero.
    pub fn new(
        params: RunParams,
        engine: IsingEngine,
        attempts_per_step: usize,
        max_steps: usize,
        probe: LivenessProbe,
    ) -> Self {
        assert!(attempts_per_step > 0, "attempts_per_step must be >= 1");
        assert!(max_steps > 0, "max_steps must be >= 1");
        Self {
            params,
            engine,
            attempts_per_step,
            max_steps,
            steps: 0,
            table: RunTable::new(),
            probe,
        }
    }

    /// Run `index` of the sweep described by `settings`, with random initial
    /// spins drawn from a stream seeded by `seed`.
    pub fn from_settings(
        settings: &Settings,
        index: usize,
        seed: u64,
        probe: LivenessProbe,
    ) -> Result<Self> {
        let params = RunParams {
            index,
            temperature: settings.temperature(index),
            field: settings.field(index),
        };
        let engine = IsingEngine::with_random_spins(
            settings.extent(),
            params.temperature,
            params.field,
            settings.data.micro_sample_count,
            Xoshiro256StarStar::seed_from_u64(seed),
        )?;
        Ok(Self::new(
            params,
            engine,
            settings.attempts_per_macro_step(),
            settings.max_steps(),
            probe,
        ))
    }

    pub fn params(&self) -> &RunParams {
        &self.params
    }

    pub fn engine(&self) -> &IsingEngine {
        &self.engine
    }

    pub fn table(&self) -> &RunTable {
        &self.table
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn probe(&self) -> LivenessProbe {
        self.probe.clone()
    }

    pub(crate) fn start(&self) {
        self.probe.mark_running();
    }

    /// One macro-step. Returns whether another one is due.
    pub fn step(&mut self) -> bool {
        self.engine.advance(self.attempts_per_step);
        self.steps += 1;
        self.observe();
        self.steps < self.max_steps
    }

    fn observe(&mut self) {
        let engine = &self.engine;
        let density = (self.steps * self.attempts_per_step) as f64 / engine.volume() as f64;
        let flips = engine.last_step_flips() as f64 / self.attempts_per_step as f64;

        self.table.append(COL_ATTEMPT_DENSITY, Value::Scalar(density));
        self.table.append(COL_TEMPERATURE, Value::Scalar(engine.temperature()));
        self.table.append(COL_FIELD, Value::Scalar(engine.field()));
        self.table.append(COL_MAGNETIZATION, engine.magnetizations().into());
        self.table.append(COL_ENERGY, engine.energies().into());
        self.table.append(COL_FLIP_RATE, Value::Scalar(flips));
    }

    /// Hand the table to `exporter` and mark the run finished. Export
    /// failures are logged, never retried.
    pub fn finish(self, exporter: &dyn Exporter) -> RunOutcome {
        let RunParams {
            index,
            temperature,
            field,
        } = self.params;
        let magnetization = self.engine.magnetization();
        let energy = self.engine.energy();
        info!(
            index,
            temperature, field, magnetization, energy, "simulation finished"
        );

        let exported = match exporter.export(&self.params, &self.table) {
            Ok(path) => {
                info!(index, path = %path.display(), "results saved");
                true
            }
            Err(e) => {
                error!(index, error = %e, "failed to save results");
                false
            }
        };
        self.probe.mark_finished();

        RunOutcome {
            index,
            temperature,
            field,
            steps: self.steps,
            magnetization,
            energy,
            exported,
        }
    }
}
