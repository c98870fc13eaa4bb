//! Metropolis Monte Carlo for the 2-D Ising model on a periodic square
//! lattice, with a bounded-concurrency runner for temperature/field sweeps.

pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod mcmc;
pub mod recorder;
pub mod simulation;
pub mod spins;
pub mod statistics;
pub mod visualize;

mod parallel;

pub use config::Settings;
pub use error::{IsingError, Result};
pub use export::{Exporter, TableExporter};
pub use geometry::{Lattice, Position};
pub use mcmc::{IsingEngine, Schedule};
pub use recorder::{Recorder, RunTable, Value};
pub use simulation::{BatchRun, BatchRunner, LivenessProbe, RunParams};
pub use statistics::{BatchSummary, RunOutcome};
pub use visualize::{SnapshotFn, SnapshotSlot, TerminalVisualizer, Visualizer};
