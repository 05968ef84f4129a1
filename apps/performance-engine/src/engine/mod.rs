//! Metric evaluation engine.
//!
//! A [`CalculationContext`] owns one portfolio (and optional benchmark) and
//! memoizes every intermediate it derives. Metrics are plain functions looked
//! up by name in the process-wide [`MetricRegistry`]; composite metrics call
//! back into the context, so shared inputs such as `Annualized` or the
//! drawdown table are computed once per context.
//!
//! ```
//! use performance_engine::CalculationContext;
//!
//! let ctx = CalculationContext::new(vec![100.0, 110.0, 99.0, 121.0], None, vec![])?;
//! let max_dd = ctx.evaluate("MaxDrawdown")?;
//! assert!((max_dd - 0.1).abs() < 1e-12);
//! # Ok::<(), performance_engine::MetricError>(())
//! ```

mod catalog;
mod context;
mod keys;
mod metrics;
mod registry;

pub use catalog::Metric;
pub use context::{CalculationContext, ContextBuilder};
pub use registry::{MetricEntry, MetricFn, MetricRegistry};
