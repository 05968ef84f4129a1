//! Drawdown-based risk metrics.

use crate::drawdown;
use crate::engine::{CalculationContext, Metric};
use crate::error::MetricError;
use crate::series::vector;

use super::nonzero;

/// Sterling denominators at or below this magnitude are treated as zero.
const STERLING_EPSILON: f64 = 1e-7;

/// Deepest drawdown as a positive fraction.
pub fn max_drawdown(ctx: &CalculationContext) -> Result<f64, MetricError> {
    Ok(-vector::min(&ctx.drawdowns()?))
}

pub fn average_drawdown(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let (count, depth, _, _) = underwater(ctx)?;
    Ok(-depth / count)
}

pub fn average_length(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let (count, _, length, _) = underwater(ctx)?;
    Ok(length / count)
}

pub fn average_recovery(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let (count, _, _, recovery) = underwater(ctx)?;
    Ok(recovery / count)
}

pub fn calmar_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let annual = ctx.metric(Metric::Annualized)?;
    let max_dd = ctx.metric(Metric::MaxDrawdown)?;
    Ok(annual / nonzero(max_dd, "CalmarRatio", "zero max drawdown")?)
}

pub fn sterling_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let annual = ctx.metric(Metric::Annualized)?;
    let max_dd = ctx.metric(Metric::MaxDrawdown)?;

    let denominator = (max_dd + ctx.config().sterling_excess).abs();
    if denominator < STERLING_EPSILON {
        return Err(MetricError::degenerate(
            "SterlingRatio",
            "max drawdown cancels the excess",
        ));
    }
    Ok(annual / denominator)
}

/// Mean absolute drawdown.
pub fn pain_index(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let dd = ctx.drawdowns()?;
    Ok(dd.iter().map(|d| d.abs()).sum::<f64>() / dd.len() as f64)
}

pub fn pain_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let annual = ctx.metric(Metric::Annualized)?;
    let pain = ctx.metric(Metric::PainIndex)?;
    Ok((annual - ctx.config().risk_free_rate) / nonzero(pain, "PainRatio", "zero pain index")?)
}

/// Burke = (Annualized − Rf) / sqrt(Σ episode²), scaled by sqrt(n) when
/// the modified variant is configured.
pub fn burke_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let annual = ctx.metric(Metric::Annualized)?;
    let values = ctx.portfolio_values()?;

    let episodes = drawdown::burke_episodes(&values);
    if episodes.is_empty() {
        return Err(MetricError::degenerate("BurkeRatio", "no drawdown episodes"));
    }

    let root_sum_square = episodes.iter().map(|d| d * d).sum::<f64>().sqrt();
    let ratio = (annual - ctx.config().risk_free_rate) / root_sum_square;
    if ctx.config().burke_modified {
        Ok(ratio * (values.len() as f64).sqrt())
    } else {
        Ok(ratio)
    }
}

/// `(count, Σdepth, Σlength, Σrecovery)` over underwater runs.
fn underwater(ctx: &CalculationContext) -> Result<(f64, f64, f64, f64), MetricError> {
    let (count, depth, length, recovery) = ctx.drawdown_table()?.underwater_totals();
    if count == 0 {
        return Err(MetricError::NoDrawdownRuns);
    }
    Ok((count as f64, depth, length, recovery))
}
