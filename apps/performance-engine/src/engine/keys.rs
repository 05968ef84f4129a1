//! Cache keys for per-context memoization.

use super::catalog::Metric;

/// Scalar cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    /// Final value of a registered metric.
    Metric(Metric),
    /// Geometric annualized benchmark return.
    BenchAnnualized,
    /// Sample variance of benchmark returns.
    BenchVariance,
    /// Downside deviation of benchmark returns below MAR.
    BenchDownsideDeviation,
}

/// Vector cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorKey {
    /// Portfolio values after any resampling.
    PortfolioValues,
    /// Benchmark values after any resampling.
    BenchValues,
    /// Portfolio return series.
    PortfolioReturns,
    /// Benchmark return series.
    BenchReturns,
    /// Portfolio returns less the per-period risk-free rate.
    PortfolioExcess,
    /// Benchmark returns less the per-period risk-free rate.
    BenchExcess,
    /// Portfolio drawdown series.
    Drawdowns,
    /// Depth of each drawdown run.
    RunDepth,
    /// Length of each drawdown run.
    RunLength,
    /// Recovery of each drawdown run.
    RunRecovery,
}
