pub mod results;
mod stats;

pub use results::{BatchSummary, RunOutcome};
pub use stats::Moments;
