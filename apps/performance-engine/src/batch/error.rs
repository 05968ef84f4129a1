//! Error types for batch evaluation.

use thiserror::Error;

/// Errors that abort a whole batch.
///
/// A job whose series are malformed does not abort the batch; it is
/// reported as a failed [`JobReport`](super::JobReport).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Thread pool initialization failed.
    #[error("Failed to initialize thread pool: {message}")]
    ThreadPoolError {
        /// Error message.
        message: String,
    },

    /// No jobs to evaluate.
    #[error("No batch jobs provided")]
    NoJobs,

    /// No metric names requested.
    #[error("No metrics requested")]
    NoMetrics,
}
