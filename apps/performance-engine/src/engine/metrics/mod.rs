//! Metric functions, one per catalog entry, grouped by what they measure.
//!
//! Every function has the [`MetricFn`](super::MetricFn) signature and reads
//! its inputs through the context, so shared intermediates are computed once.

pub(crate) mod distribution;
pub(crate) mod downside;
pub(crate) mod drawdown;
pub(crate) mod relative;

use crate::error::MetricError;

/// Pass `value` through unless it is zero, in which case the ratio `metric`
/// would divide by zero.
fn nonzero(value: f64, metric: &'static str, reason: &'static str) -> Result<f64, MetricError> {
    if value == 0.0 {
        Err(MetricError::degenerate(metric, reason))
    } else {
        Ok(value)
    }
}
