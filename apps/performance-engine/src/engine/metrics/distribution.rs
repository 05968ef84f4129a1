//! Return distribution metrics.

use crate::engine::{CalculationContext, Metric};
use crate::error::MetricError;
use crate::series::{stats, vector};

use super::nonzero;

/// Annualized = (Π(1+r))^(scale/n) - 1
pub fn annualized(ctx: &CalculationContext) -> Result<f64, MetricError> {
    stats::annualize(&ctx.portfolio_returns()?, ctx.scale(), true)
}

pub fn mean_geometric(ctx: &CalculationContext) -> Result<f64, MetricError> {
    stats::mean_geometric(&ctx.portfolio_returns()?)
}

pub fn variance(ctx: &CalculationContext) -> Result<f64, MetricError> {
    stats::variance(&ctx.portfolio_returns()?)
}

pub fn std_dev(ctx: &CalculationContext) -> Result<f64, MetricError> {
    Ok(ctx.metric(Metric::Variance)?.sqrt())
}

pub fn std_dev_annualized(ctx: &CalculationContext) -> Result<f64, MetricError> {
    Ok(ctx.metric(Metric::StdDev)? * ctx.scale().sqrt())
}

/// Sharpe = Annualized(r - Rf) / StdDev_Annualized(r)
pub fn sharpe_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let excess = stats::annualize(&ctx.portfolio_excess()?, ctx.scale(), true)?;
    let sigma = ctx.metric(Metric::StdDevAnnualized)?;
    Ok(excess / nonzero(sigma, "SharpeRatio", "zero volatility")?)
}

pub fn sharpe_ratio_annualized(ctx: &CalculationContext) -> Result<f64, MetricError> {
    ctx.metric(Metric::SharpeRatio)
}

pub fn skewness(ctx: &CalculationContext) -> Result<f64, MetricError> {
    stats::skewness(&ctx.portfolio_returns()?)
}

pub fn kurtosis(ctx: &CalculationContext) -> Result<f64, MetricError> {
    stats::kurtosis(&ctx.portfolio_returns()?)
}

/// SR · (1 + (S/6)·SR − ((K−3)/24)·SR²) with SR = (Annualized − Rf) / σ
pub fn adjusted_sharpe_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let annual = ctx.metric(Metric::Annualized)?;
    let sigma = ctx.metric(Metric::StdDevAnnualized)?;
    let k = ctx.metric(Metric::Kurtosis)?;
    let s = ctx.metric(Metric::Skewness)?;

    let sr = (annual - ctx.config().risk_free_rate)
        / nonzero(sigma, "AdjustedSharpeRatio", "zero volatility")?;
    Ok(sr * (1.0 + (s / 6.0) * sr - ((k - 3.0) / 24.0) * sr * sr))
}

pub fn skewness_kurtosis_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let s = ctx.metric(Metric::Skewness)?;
    let k = ctx.metric(Metric::Kurtosis)?;
    Ok(s / nonzero(k, "SkewnessKurtosisRatio", "zero kurtosis")?)
}

pub fn mean_absolute_deviation(ctx: &CalculationContext) -> Result<f64, MetricError> {
    stats::mean_absolute_deviation(&ctx.portfolio_returns()?)
}

/// Kelly = (mean(r) − Rf) / Variance(r)
pub fn kelly_ratio_full(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let var = ctx.metric(Metric::Variance)?;
    let mean = vector::average(&ctx.portfolio_returns()?);
    Ok((mean - ctx.periodic_risk_free()) / nonzero(var, "KellyRatio_Full", "zero variance")?)
}

pub fn kelly_ratio_half(ctx: &CalculationContext) -> Result<f64, MetricError> {
    Ok(ctx.metric(Metric::KellyRatioFull)? / 2.0)
}

pub fn upside_frequency(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let mar = ctx.periodic_mar();
    frequency(&ctx.portfolio_returns()?, |r| r > mar)
}

pub fn downside_frequency(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let mar = ctx.periodic_mar();
    frequency(&ctx.portfolio_returns()?, |r| r < mar)
}

/// D = −(Σloss · #loss) / (Σgain · #gain)
pub fn d_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let split = GainLoss::of(&ctx.portfolio_returns()?);
    let gain = split.gain_sum * split.gain_count as f64;
    Ok(-(split.loss_sum * split.loss_count as f64) / nonzero(gain, "DRatio", "no positive returns")?)
}

/// Bernardo-Ledoit = −Σgain / Σloss
pub fn bernardo_ledoit_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let split = GainLoss::of(&ctx.portfolio_returns()?);
    Ok(-split.gain_sum
        / nonzero(
            split.loss_sum,
            "BernardoLedoitRatio",
            "no negative returns",
        )?)
}

fn frequency(returns: &[f64], predicate: impl Fn(f64) -> bool) -> Result<f64, MetricError> {
    let hits = returns.iter().filter(|&&r| predicate(r)).count();
    Ok(hits as f64 / returns.len() as f64)
}

/// Strictly positive and strictly negative returns, summed and counted.
#[derive(Debug, Default)]
struct GainLoss {
    gain_sum: f64,
    gain_count: usize,
    loss_sum: f64,
    loss_count: usize,
}

impl GainLoss {
    fn of(returns: &[f64]) -> Self {
        returns.iter().fold(Self::default(), |mut acc, &r| {
            if r > 0.0 {
                acc.gain_sum += r;
                acc.gain_count += 1;
            } else if r < 0.0 {
                acc.loss_sum += r;
                acc.loss_count += 1;
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(values: &[f64]) -> CalculationContext {
        CalculationContext::new(values.to_vec(), None, vec![]).unwrap()
    }

    #[test]
    fn test_annualized_daily_scale() {
        let ctx = context(&[100.0, 101.0, 102.01]);
        let expected = 1.0201_f64.powf(252.0 / 3.0) - 1.0;
        assert!((annualized(&ctx).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_std_dev_chain() {
        let ctx = context(&[100.0, 102.0, 101.0, 104.0, 103.0]);
        let var = variance(&ctx).unwrap();

        assert!((std_dev(&ctx).unwrap() - var.sqrt()).abs() < 1e-15);
        assert!((std_dev_annualized(&ctx).unwrap() - var.sqrt() * 252.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sharpe_variants_agree() {
        let ctx = context(&[100.0, 102.0, 101.0, 104.0, 103.0]);
        assert_eq!(
            sharpe_ratio(&ctx).unwrap(),
            sharpe_ratio_annualized(&ctx).unwrap()
        );
    }

    #[test]
    fn test_sharpe_zero_volatility() {
        let ctx = context(&[100.0, 100.0, 100.0, 100.0]);
        assert!(matches!(
            sharpe_ratio(&ctx),
            Err(MetricError::DivisionDegenerate { .. })
        ));
    }

    #[test]
    fn test_frequencies_partition_returns() {
        let ctx = context(&[100.0, 110.0, 99.0, 121.0, 121.0]);
        // Returns: 0, 0.1, -0.1, 0.2222, 0; periodic MAR ≈ 0.000119.
        assert!((upside_frequency(&ctx).unwrap() - 0.4).abs() < 1e-12);
        assert!((downside_frequency(&ctx).unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_gain_loss_ratios() {
        let ctx = context(&[100.0, 110.0, 99.0, 121.0]);
        let gain = 0.1 + (121.0 / 99.0 - 1.0);
        let loss = -0.1;

        let d = d_ratio(&ctx).unwrap();
        assert!((d - (0.1 * 1.0) / (gain * 2.0)).abs() < 1e-12);

        let bl = bernardo_ledoit_ratio(&ctx).unwrap();
        assert!((bl - (-gain / loss)).abs() < 1e-12);
    }

    #[test]
    fn test_no_losses_is_degenerate() {
        let ctx = context(&[100.0, 101.0, 102.0]);
        assert!(matches!(
            bernardo_ledoit_ratio(&ctx),
            Err(MetricError::DivisionDegenerate { .. })
        ));
    }

    #[test]
    fn test_kelly_half() {
        let ctx = context(&[100.0, 102.0, 101.0, 104.0, 103.0]);
        let full = kelly_ratio_full(&ctx).unwrap();
        assert!((kelly_ratio_half(&ctx).unwrap() - full / 2.0).abs() < 1e-15);
    }
}
