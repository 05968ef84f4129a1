//! Benchmark-relative metrics.
//!
//! Every function here requires a benchmark; [`CalculationContext::metric`]
//! rejects the call with `BenchmarkRequired` before any of them runs.
//! Regression-based metrics fail with `DivisionDegenerate` when the
//! benchmark has no variance, since beta is then undefined.

use crate::capm::{self, Regression};
use crate::config::AppraisalMethod;
use crate::engine::keys::ScalarKey;
use crate::engine::{CalculationContext, Metric};
use crate::error::MetricError;
use crate::series::{stats, vector};

use super::nonzero;

pub fn active_premium(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let annual = ctx.metric(Metric::Annualized)?;
    Ok(annual - bench_annualized(ctx, "ActivePremium")?)
}

/// Annualized volatility of `r − b`.
pub fn tracking_error(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let r = ctx.portfolio_returns()?;
    let b = ctx.bench_returns("TrackingError")?;
    if r.len() != b.len() {
        return Err(MetricError::invalid_input(format!(
            "TrackingError: portfolio ({}) and bench ({}) differ in length",
            r.len(),
            b.len()
        )));
    }

    let active = vector::subtract(&r, &b);
    Ok((stats::variance(&active)? * ctx.scale()).sqrt())
}

pub fn information_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let premium = ctx.metric(Metric::ActivePremium)?;
    let te = ctx.metric(Metric::TrackingError)?;
    Ok(premium / nonzero(te, "InformationRatio", "zero tracking error")?)
}

/// M² = (Annualized − Rf)·σ_b/σ_p + Rf
pub fn m_squared(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let annual = ctx.metric(Metric::Annualized)?;
    let p_var = ctx.metric(Metric::Variance)?;
    let b_var = bench_variance(ctx, "MSquared")?;

    let n = ctx.portfolio_returns()?.len() as f64;
    let sigma = |var: f64| (var * (n - 1.0) / n).sqrt() * ctx.scale().sqrt();
    let sigma_p = nonzero(sigma(p_var), "MSquared", "zero portfolio volatility")?;

    let rf = ctx.config().risk_free_rate;
    Ok((annual - rf) * sigma(b_var) / sigma_p + rf)
}

/// Arithmetic excess of M² over the benchmark's annualized return.
pub fn m_squared_excess(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let m2 = ctx.metric(Metric::MSquared)?;
    Ok(m2 - bench_annualized(ctx, "MSquaredExcess")?)
}

pub fn jensen_alpha(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let fit = fit(ctx, "JensenAlpha2")?;
    let annual = ctx.metric(Metric::Annualized)?;
    let bench = bench_annualized(ctx, "JensenAlpha2")?;

    let rf = ctx.config().risk_free_rate;
    Ok(fit.beta.mul_add(-(bench - rf), annual - rf))
}

pub fn treynor_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let fit = fit(ctx, "TreynorRatio")?;
    let excess = stats::annualize(&ctx.portfolio_excess()?, ctx.scale(), true)?;
    Ok(excess / nonzero(fit.beta, "TreynorRatio", "zero beta")?)
}

pub fn appraisal_ratio(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let alpha = ctx.metric(Metric::JensenAlpha)?;
    let (denominator, reason) = match ctx.config().appraisal_method {
        AppraisalMethod::Appraisal => (ctx.metric(Metric::SpecificRisk)?, "zero specific risk"),
        AppraisalMethod::Modified => (fit(ctx, "AppraisalRatio")?.beta, "zero beta"),
        AppraisalMethod::Alternative => {
            (ctx.metric(Metric::SystematicRisk)?, "zero systematic risk")
        }
    };
    Ok(alpha / nonzero(denominator, "AppraisalRatio", reason)?)
}

/// Population standard deviation of the regression residuals, annualized.
pub fn specific_risk(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let fit = fit(ctx, "SpecificRisk")?;
    let x = ctx.bench_excess("SpecificRisk")?;
    let y = ctx.portfolio_excess()?;

    let eps = capm::residuals(&x, &y, fit);
    if eps.is_empty() {
        return Err(MetricError::insufficient("SpecificRisk", 0, 0));
    }
    let mean = vector::average(&eps);
    let spread = eps.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / eps.len() as f64;
    Ok(spread.sqrt() * ctx.scale().sqrt())
}

pub fn systematic_risk(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let fit = fit(ctx, "SystematicRisk")?;
    let var = stats::variance(&ctx.bench_excess("SystematicRisk")?)?;
    Ok(fit.beta * (var * ctx.scale()).sqrt())
}

pub fn total_risk(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let systematic = ctx.metric(Metric::SystematicRisk)?;
    let specific = ctx.metric(Metric::SpecificRisk)?;
    Ok(systematic.hypot(specific))
}

pub fn fama_beta(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let scale = ctx.scale();
    let portfolio = stats::annualized_sigma(&ctx.portfolio_returns()?, scale)?;
    let bench = stats::annualized_sigma(&ctx.bench_returns("FamaBeta")?, scale)?;
    Ok(portfolio / nonzero(bench, "FamaBeta", "zero benchmark volatility")?)
}

/// Up-capture: portfolio return mass over benchmark return mass, taken over
/// the periods where the benchmark rose.
pub fn up_down_ratios(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let r = ctx.portfolio_returns()?;
    let b = ctx.bench_returns("UpDownRatios")?;

    let (portfolio, bench) = r
        .iter()
        .zip(b.iter())
        .filter(|&(_, &bi)| bi > 0.0)
        .fold((0.0, 0.0), |(sr, sb), (ri, bi)| (sr + ri, sb + bi));
    Ok(portfolio / nonzero(bench, "UpDownRatios", "benchmark never rose")?)
}

/// Sortino-based M²: Annualized + Sortino·(σ_D(b) − σ_D(r)), annualized.
pub fn m2_sortino(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let annual = ctx.metric(Metric::Annualized)?;
    let sortino = ctx.metric(Metric::SortinoRatio)?;
    let root = ctx.scale().sqrt();

    let portfolio = ctx.metric(Metric::DownsideDeviation)? * root;
    let bench = bench_downside_deviation(ctx, "M2Sortino")? * root;
    Ok(sortino.mul_add(bench - portfolio, annual))
}

pub fn omega_excess_return(ctx: &CalculationContext) -> Result<f64, MetricError> {
    let annual = ctx.metric(Metric::Annualized)?;
    let scale = ctx.scale();

    let portfolio = ctx.metric(Metric::DownsideDeviation)? * scale.sqrt();
    let bench = bench_downside_deviation(ctx, "OmegaExcessReturn")? * scale.sqrt();
    Ok((3.0 * portfolio).mul_add(-bench, annual))
}

// =============================================================================
// Shared benchmark scalars
// =============================================================================

fn bench_annualized(ctx: &CalculationContext, metric: &'static str) -> Result<f64, MetricError> {
    ctx.scalar(ScalarKey::BenchAnnualized, || {
        stats::annualize(&ctx.bench_returns(metric)?, ctx.scale(), true)
    })
}

fn bench_variance(ctx: &CalculationContext, metric: &'static str) -> Result<f64, MetricError> {
    ctx.scalar(ScalarKey::BenchVariance, || {
        stats::variance(&ctx.bench_returns(metric)?)
    })
}

fn bench_downside_deviation(
    ctx: &CalculationContext,
    metric: &'static str,
) -> Result<f64, MetricError> {
    ctx.scalar(ScalarKey::BenchDownsideDeviation, || {
        stats::downside_deviation(&ctx.bench_returns(metric)?, ctx.periodic_mar())
    })
}

/// Regression with a defined beta.
fn fit(ctx: &CalculationContext, metric: &'static str) -> Result<Regression, MetricError> {
    let fit = ctx.regression(metric)?;
    if fit.beta.is_nan() {
        return Err(MetricError::degenerate(metric, "zero benchmark variance"));
    }
    Ok(fit)
}
