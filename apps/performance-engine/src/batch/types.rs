//! Batch jobs and their per-job outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::MetricReport;
use crate::series::ReturnMethod;

/// One series set to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesJob {
    /// Caller-chosen job identifier.
    pub job_id: String,

    /// Portfolio value series.
    pub portfolio: Vec<f64>,

    /// Optional benchmark value series.
    #[serde(default)]
    pub bench: Option<Vec<f64>>,

    /// Sample timestamps, empty when `period` is supplied or unknown.
    #[serde(default)]
    pub timestamps: Vec<DateTime<Utc>>,

    /// Periods per year, overriding inference.
    #[serde(default)]
    pub period: Option<f64>,

    /// Return method.
    #[serde(default)]
    pub method: ReturnMethod,
}

impl SeriesJob {
    /// Create a job over a portfolio series only.
    #[must_use]
    pub fn new(job_id: impl Into<String>, portfolio: Vec<f64>) -> Self {
        Self {
            job_id: job_id.into(),
            portfolio,
            bench: None,
            timestamps: Vec::new(),
            period: None,
            method: ReturnMethod::Discrete,
        }
    }

    /// Attach a benchmark series.
    #[must_use]
    pub fn with_bench(mut self, bench: Vec<f64>) -> Self {
        self.bench = Some(bench);
        self
    }

    /// Attach sample timestamps.
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Supply the periods per year directly.
    #[must_use]
    pub const fn with_period(mut self, period: f64) -> Self {
        self.period = Some(period);
        self
    }

    /// Use a non-default return method.
    #[must_use]
    pub const fn with_method(mut self, method: ReturnMethod) -> Self {
        self.method = method;
        self
    }
}

/// Outcome of one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    /// Job identifier.
    pub job_id: String,

    /// Evaluated metrics, absent when the context could not be built.
    pub report: Option<MetricReport>,

    /// Wall time spent on the job in milliseconds.
    pub execution_time_ms: u64,

    /// Why the context could not be built.
    pub error: Option<String>,

    /// Whether the context was built and the metrics evaluated.
    pub success: bool,
}
