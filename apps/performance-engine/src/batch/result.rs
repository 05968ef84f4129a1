//! Aggregate result of a batch run.

use serde::Serialize;

use super::types::JobReport;

/// Result of [`BatchEvaluator::run`](super::BatchEvaluator::run).
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Per-job outcomes, in input order.
    pub results: Vec<JobReport>,

    /// Total wall time in milliseconds.
    pub total_time_ms: u64,

    /// Number of jobs executed.
    pub jobs_executed: u64,

    /// Number of jobs evaluated.
    pub jobs_succeeded: u64,

    /// Number of jobs whose context could not be built.
    pub jobs_failed: u64,
}

impl BatchResult {
    /// Share of jobs that succeeded.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.jobs_executed == 0 {
            0.0
        } else {
            self.jobs_succeeded as f64 / self.jobs_executed as f64
        }
    }

    /// Look up a job by identifier.
    #[must_use]
    pub fn get(&self, job_id: &str) -> Option<&JobReport> {
        self.results.iter().find(|r| r.job_id == job_id)
    }

    /// Successful jobs only.
    #[must_use]
    pub fn successful_results(&self) -> Vec<&JobReport> {
        self.results.iter().filter(|r| r.success).collect()
    }

    /// Failed jobs only.
    #[must_use]
    pub fn failed_results(&self) -> Vec<&JobReport> {
        self.results.iter().filter(|r| !r.success).collect()
    }

    /// Render as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
