// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::items_after_statements,
        clippy::suboptimal_flops
    )
)]

//! Performance Engine - Rust Core Library
//!
//! Risk/return statistics for portfolio value series, optionally measured
//! against a benchmark.
//!
//! # Architecture
//!
//! - **Series**: numeric building blocks with no knowledge of metrics
//!   - `series`: return derivation, element-wise helpers, moments
//!   - `periodicity`: frequency inference and minute-to-daily resampling
//!   - `drawdown`: drawdown series and same-sign run segmentation
//!   - `capm`: OLS alpha and beta
//!
//! - **Engine**: the metric catalog and its memoized evaluation
//!   - `engine`: `CalculationContext`, `Metric`, `MetricRegistry`
//!   - `report`: serializable per-context snapshots
//!   - `batch`: parallel evaluation of many series with rayon
//!
//! - **Ambient**: `config` (YAML with env interpolation), `telemetry`
//!   (tracing subscriber setup) and `error`
//!
//! - **Legacy**: `legacy`, the unmemoized windowed evaluator kept as a
//!   differential oracle
//!
//! # Example
//!
//! ```rust
//! use performance_engine::CalculationContext;
//!
//! let ctx = CalculationContext::new(vec![100.0, 110.0, 99.0, 121.0], None, vec![])?;
//! assert!((ctx.evaluate("MaxDrawdown")? - 0.1).abs() < 1e-12);
//! # Ok::<(), performance_engine::MetricError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Numeric Building Blocks
// =============================================================================

/// Return series derivation and descriptive statistics.
pub mod series;

/// Sampling frequency inference and resampling.
pub mod periodicity;

/// Drawdown series and run segmentation.
pub mod drawdown;

/// CAPM regression.
pub mod capm;

// =============================================================================
// Metric Evaluation
// =============================================================================

/// Metric catalog, registry and memoized calculation context.
pub mod engine;

/// Serializable metric reports.
pub mod report;

/// Parallel evaluation over many series.
pub mod batch;

/// Windowed legacy evaluator.
pub mod legacy;

// =============================================================================
// Ambient
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Error types.
pub mod error;

/// Logging setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::{
    CalculationContext, ContextBuilder, Metric, MetricEntry, MetricFn, MetricRegistry,
};
pub use error::{ErrorKind, MetricError};
pub use report::{MetricReport, MetricValue};
pub use series::{ReturnMethod, returns};

pub use periodicity::{Frequency, infer_period, resample_to_daily};

pub use config::{Config, MetricConfig};

pub use batch::BatchEvaluator;
pub use legacy::{LegacyEvaluator, SlidingWindow};
