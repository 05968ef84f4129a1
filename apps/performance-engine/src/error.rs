//! Error types for metric evaluation.
//!
//! Every metric returns `Result<f64, MetricError>`. Composite metrics
//! propagate the first failure of their inputs unchanged, so the error a
//! caller sees names the sub-computation that actually failed.
//!
//! # Error Kinds
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `INVALID_INPUT` | Unknown return method, strict length mismatch, empty value series |
//! | `INSUFFICIENT_DATA` | Fewer samples than the statistic needs |
//! | `EMPTY_SERIES` | Drawdown computation over an empty return series |
//! | `NO_DRAWDOWN_RUNS` | Average-drawdown family with no underwater run |
//! | `BENCHMARK_REQUIRED` | Relative metric on a context without a benchmark |
//! | `UNKNOWN_METRIC` | Name absent from the registry |
//! | `DIVISION_DEGENERATE` | Denominator numerically zero |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes for metric failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed argument or mismatched series lengths.
    InvalidInput,
    /// Not enough samples for the statistic.
    InsufficientData,
    /// Empty return series handed to the drawdown path.
    EmptySeries,
    /// No run with strictly negative depth.
    NoDrawdownRuns,
    /// Metric needs a benchmark series.
    BenchmarkRequired,
    /// Metric name not registered.
    UnknownMetric,
    /// Zero or near-zero denominator.
    DivisionDegenerate,
}

impl ErrorKind {
    /// Get the reason string for this kind.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::InsufficientData => "INSUFFICIENT_DATA",
            Self::EmptySeries => "EMPTY_SERIES",
            Self::NoDrawdownRuns => "NO_DRAWDOWN_RUNS",
            Self::BenchmarkRequired => "BENCHMARK_REQUIRED",
            Self::UnknownMetric => "UNKNOWN_METRIC",
            Self::DivisionDegenerate => "DIVISION_DEGENERATE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Failure of a metric or one of its inputs.
///
/// Cloneable so failed evaluations can be cached and replayed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricError {
    /// Malformed input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Too few samples.
    #[error("{metric} requires more than {required} samples, got {actual}")]
    InsufficientData {
        /// Statistic that was attempted.
        metric: &'static str,
        /// Minimum sample count (exclusive).
        required: usize,
        /// Samples available.
        actual: usize,
    },

    /// Drawdowns requested over an empty return series.
    #[error("Cannot compute drawdowns of an empty return series")]
    EmptySeries,

    /// No underwater run to average over.
    #[error("No drawdown runs with negative depth")]
    NoDrawdownRuns,

    /// Relative metric evaluated without a benchmark.
    #[error("{metric} requires a benchmark series")]
    BenchmarkRequired {
        /// Metric that needs the benchmark.
        metric: &'static str,
    },

    /// Name not present in the registry.
    #[error("No such metric: {0}")]
    UnknownMetric(String),

    /// Denominator is zero or numerically indistinguishable from it.
    #[error("{metric} is undefined: {reason}")]
    DivisionDegenerate {
        /// Metric being computed.
        metric: &'static str,
        /// Which denominator vanished.
        reason: &'static str,
    },
}

impl MetricError {
    /// Get the error code.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::EmptySeries => ErrorKind::EmptySeries,
            Self::NoDrawdownRuns => ErrorKind::NoDrawdownRuns,
            Self::BenchmarkRequired { .. } => ErrorKind::BenchmarkRequired,
            Self::UnknownMetric(_) => ErrorKind::UnknownMetric,
            Self::DivisionDegenerate { .. } => ErrorKind::DivisionDegenerate,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an insufficient data error.
    #[must_use]
    pub const fn insufficient(metric: &'static str, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            metric,
            required,
            actual,
        }
    }

    /// Create a degenerate division error.
    #[must_use]
    pub const fn degenerate(metric: &'static str, reason: &'static str) -> Self {
        Self::DivisionDegenerate { metric, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            MetricError::insufficient("Variance", 2, 1).kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(MetricError::EmptySeries.kind(), ErrorKind::EmptySeries);
        assert_eq!(
            MetricError::UnknownMetric("Foo".to_string()).kind(),
            ErrorKind::UnknownMetric
        );
        assert_eq!(
            MetricError::degenerate("CalmarRatio", "zero max drawdown").kind(),
            ErrorKind::DivisionDegenerate
        );
    }

    #[test]
    fn test_error_messages() {
        let err = MetricError::insufficient("Kurtosis", 3, 2);
        assert_eq!(err.to_string(), "Kurtosis requires more than 3 samples, got 2");

        let err = MetricError::BenchmarkRequired {
            metric: "TrackingError",
        };
        assert!(err.to_string().contains("TrackingError"));

        let err = MetricError::UnknownMetric("Foo".to_string());
        assert_eq!(err.to_string(), "No such metric: Foo");
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::NoDrawdownRuns).unwrap();
        assert_eq!(json, "\"NO_DRAWDOWN_RUNS\"");
        assert_eq!(ErrorKind::DivisionDegenerate.to_string(), "DIVISION_DEGENERATE");
    }
}
