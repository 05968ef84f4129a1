//! Metrics built on partial moments around the minimum acceptable return.

use crate::engine::{CalculationContext, Metric};
use crate::error::MetricError;
use crate::series::{stats, vector};

use super::nonzero;

/// Subset downside deviation below the periodic MAR.
pub fn downside_deviation(ctx: &CalculationContext) -> Result<f64, MetricError> {
    stats::downside_deviation(&ctx.portfolio_returns()?, ctx.periodic_mar())
}

/// Sortino = (mean(r) − mar) / DD
pub fn sortino_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let dd = ctx.metric(Metric::DownsideDeviation)?;
    let mean = vector::average(&ctx.portfolio_returns()?);
    Ok((mean - ctx.periodic_mar()) / dd)
}

/// Losses weighted by the configured loss aversion before averaging.
pub fn prospect_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let dd = ctx.metric(Metric::DownsideDeviation)?;
    let returns = ctx.portfolio_returns()?;
    let weight = ctx.config().prospect_loss_weight;

    let weighted: f64 = returns
        .iter()
        .map(|&r| if r > 0.0 { r } else { weight * r })
        .sum();
    Ok((weighted / returns.len() as f64 - ctx.periodic_mar()) / dd)
}

pub fn upside_potential_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let dd = ctx.metric(Metric::DownsideDeviation)?;
    let mar = ctx.periodic_mar();
    let (excess, count) = ctx
        .portfolio_returns()?
        .iter()
        .filter(|&&r| r > mar)
        .fold((0.0, 0_usize), |(sum, count), r| (sum + (r - mar), count + 1));

    if count == 0 {
        return Err(MetricError::degenerate(
            "UpsidePotentialRatio",
            "no returns above MAR",
        ));
    }
    Ok(excess / count as f64 / dd)
}

pub fn upside_risk(ctx: &CalculationContext) -> Result<f64, MetricError> {
    Ok(stats::upside_risk(&ctx.portfolio_returns()?, ctx.periodic_mar()))
}

pub fn volatility_skewness_variance(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let up = ctx.metric(Metric::UpsideRisk)?;
    let down = ctx.metric(Metric::DownsideDeviation)?;
    Ok(up.powi(2) / down.powi(2))
}

pub fn volatility_skewness_risk(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let up = ctx.metric(Metric::UpsideRisk)?;
    let down = ctx.metric(Metric::DownsideDeviation)?;
    Ok(up / nonzero(down, "VolatilitySkewness_Risk", "zero downside deviation")?)
}

pub fn kappa(ctx: &CalculationContext) -> Result<f64, MetricError> {
    stats::kappa(
        &ctx.portfolio_returns()?,
        ctx.periodic_mar(),
        ctx.config().kappa_order,
    )
}
