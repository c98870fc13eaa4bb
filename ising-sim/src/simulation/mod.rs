pub mod probe;
pub mod run;

pub use probe::LivenessProbe;
pub use run::{BatchRun, RunParams};

use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use rayon::ScopeFifo;
use tracing::{debug, error, info};
use validator::Validate;

use crate::config::Settings;
use crate::error::{IsingError, Result};
use crate::export::Exporter;
use crate::parallel::{bounded_pool, ActiveRuns};
use crate::statistics::{BatchSummary, RunOutcome};
use crate::visualize::{SnapshotSlot, Visualizer};

/// State shared by every run of one batch.
struct Shared<'a> {
    active: ActiveRuns,
    outcomes: Mutex<Vec<RunOutcome>>,
    failures: Mutex<Vec<IsingError>>,
    on_step: &'a (dyn Fn() + Sync),
}

/// Drives the whole temperature/field sweep: run `i` simulates at
/// `T(i) = T0 + i * dT`, `H(i) = H0 + i * dH`, with at most `maxConcurrent`
/// runs executing at once.
pub struct BatchRunner {
    settings: Settings,
    exporter: Arc<dyn Exporter>,
    visualizer: Option<Arc<dyn Visualizer>>,
}

impl BatchRunner {
    pub fn new(settings: Settings, exporter: Arc<dyn Exporter>) -> Self {
        Self {
            settings,
            exporter,
            visualizer: None,
        }
    }

    /// Attach a visualizer to every run.
    pub fn with_visualizer(mut self, visualizer: Arc<dyn Visualizer>) -> Self {
        self.visualizer = Some(visualizer);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Macro-steps across the whole batch, for progress reporting.
    pub fn total_steps(&self) -> u64 {
        (self.settings.initial_conditions.simulation_count * self.settings.max_steps()) as u64
    }

    /// Run every simulation of the sweep to completion.
    ///
    /// `on_step` is called once per macro-step of every run, from the run's
    /// worker thread. Export failures do not fail the batch; they show up in
    /// [`BatchSummary::export_failures`]. Settings are re-validated first, and
    /// a run that cannot be set up fails the batch once every other run is
    /// done.
    pub fn run(&self, on_step: &(dyn Fn() + Sync)) -> Result<BatchSummary> {
        self.settings.validate()?;
        let ic = &self.settings.initial_conditions;
        let base_seed = ic.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let pool = bounded_pool(ic.max_concurrent)?;
        let shared = Shared {
            active: ActiveRuns::default(),
            outcomes: Mutex::new(Vec::with_capacity(ic.simulation_count)),
            failures: Mutex::new(Vec::new()),
            on_step,
        };

        info!(
            runs = ic.simulation_count,
            max_concurrent = ic.max_concurrent,
            base_seed,
            "starting batch"
        );

        let probes: Vec<LivenessProbe> = pool.scope_fifo(|scope| {
            (0..ic.simulation_count)
                .map(|index| self.launch(scope, index, base_seed, &shared))
                .collect()
        });
        debug_assert!(probes.iter().all(LivenessProbe::is_finished));
        if let Some(err) = shared.failures.into_inner().into_iter().next() {
            return Err(err);
        }

        let mut outcomes = shared.outcomes.into_inner();
        outcomes.sort_by_key(|o| o.index);
        let summary = BatchSummary {
            outcomes,
            peak_concurrency: shared.active.peak(),
        };
        info!(
            completed = summary.completed(),
            export_failures = summary.export_failures(),
            peak_concurrency = summary.peak_concurrency,
            "finished batch"
        );
        Ok(summary)
    }

    /// Queue run `index` on the pool. The returned probe stays pending until
    /// a worker picks the run up.
    fn launch<'scope>(
        &'scope self,
        scope: &ScopeFifo<'scope>,
        index: usize,
        base_seed: u64,
        shared: &'scope Shared<'scope>,
    ) -> LivenessProbe {
        let probe = LivenessProbe::new();
        let handle = probe.clone();
        scope.spawn_fifo(move |_| {
            let seed = base_seed.wrapping_add(index as u64);
            self.drive(index, seed, handle, shared);
        });
        probe
    }

    fn drive(&self, index: usize, seed: u64, probe: LivenessProbe, shared: &Shared<'_>) {
        let _admitted = shared.active.enter();
        let mut run = match BatchRun::from_settings(&self.settings, index, seed, probe.clone()) {
            Ok(run) => run,
            Err(e) => {
                error!(index, error = %e, "could not set up simulation");
                probe.mark_finished();
                shared.failures.lock().push(e);
                return;
            }
        };
        run.start();

        let snapshots = self.visualizer.as_ref().map(|viz| {
            let slot = SnapshotSlot::new(run.engine().snapshot());
            let reader = slot.clone();
            viz.attach(
                format!("run {index}"),
                Box::new(move || reader.latest()),
                self.settings.redraw_interval(),
                run.probe(),
            );
            slot
        });

        let RunParams {
            temperature, field, ..
        } = *run.params();
        info!(
            index,
            temperature,
            field,
            seed,
            active = shared.active.active(),
            "simulation started"
        );

        loop {
            let more = run.step();
            if let Some(slot) = &snapshots {
                slot.publish(run.engine().snapshot());
            }
            (shared.on_step)();
            debug!(index, step = run.steps(), max_steps = run.max_steps(), "finished step");
            if !more {
                break;
            }
        }

        let outcome = run.finish(self.exporter.as_ref());
        shared.outcomes.lock().push(outcome);
    }
}
