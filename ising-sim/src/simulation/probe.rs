use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const FINISHED: u8 = 2;

/// Shared view of a run's lifecycle: pending, running, finished.
///
/// A run counts as finished only after its final export has been attempted.
#[derive(Debug, Clone, Default)]
pub struct LivenessProbe(Arc<AtomicU8>);

impl LivenessProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the run is executing.
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire) == RUNNING
    }

    pub fn is_finished(&self) -> bool {
        self.0.load(Ordering::Acquire) == FINISHED
    }

    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire) == PENDING
    }

    pub(crate) fn mark_running(&self) {
        self.0.store(RUNNING, Ordering::Release);
    }

    pub(crate) fn mark_finished(&self) {
        self.0.store(FINISHED, Ordering::Release);
    }
}
