use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;

/// Worker pool with exactly `max_concurrent` threads.
///
/// A run holds its worker from start to final export, so the pool size is the
/// admission limit: run `k + 1` starts only once a worker frees.
pub fn bounded_pool(max_concurrent: usize) -> Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(max_concurrent.max(1))
        .thread_name(|i| format!("ising-run-{i}"))
        .build()?;
    Ok(pool)
}

/// Count of runs currently executing, with a high-water mark.
#[derive(Debug, Default)]
pub struct ActiveRuns {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ActiveRuns {
    /// Register a run as executing until the guard is dropped.
    pub fn enter(&self) -> ActiveGuard<'_> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        ActiveGuard(self)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct ActiveGuard<'a>(&'a ActiveRuns);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}
