//! Job counters for one batch run.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Succeeded and failed job counts, shared by the workers of one batch.
#[derive(Debug)]
pub struct BatchProgress {
    total: usize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl BatchProgress {
    pub const fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Count one finished job.
    pub fn record(&self, success: bool) {
        let counter = if success { &self.succeeded } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub const fn total(&self) -> usize {
        self.total
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn finished(&self) -> usize {
        self.succeeded() + self.failed()
    }

    /// Finished share in percent. An empty batch counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.finished() as f64 * 100.0 / self.total as f64
        }
    }
}
