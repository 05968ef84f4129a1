//! Configuration for parallel batch evaluation.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Configuration for parallel batch evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of threads to use (0 = use all available).
    #[serde(default)]
    pub max_threads: usize,

    /// Minimum parallelization threshold (batches below this run sequentially).
    #[serde(default = "default_min_parallel_jobs")]
    pub min_parallel_jobs: usize,

    /// Whether to log progress as jobs complete.
    #[serde(default = "default_true")]
    pub track_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            min_parallel_jobs: default_min_parallel_jobs(),
            track_progress: true,
        }
    }
}

const fn default_min_parallel_jobs() -> usize {
    4
}
