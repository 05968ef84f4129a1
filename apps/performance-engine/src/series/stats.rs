//! Descriptive statistics over return series.
//!
//! All functions take per-period returns. Rates passed as `mar` are already
//! per-period (annual MAR divided by the annualization scale).

use crate::error::MetricError;

use super::vector::{add_scalar, average, product, sum};

/// Sample variance: `(Σx² − (Σx)²/n) / (n−1)`.
///
/// # Errors
///
/// Returns `InsufficientData` when `n <= 2`.
pub fn variance(series: &[f64]) -> Result<f64, MetricError> {
    let n = series.len();
    if n <= 2 {
        return Err(MetricError::insufficient("Variance", 2, n));
    }

    let n = n as f64;
    let sum_x = sum(series);
    let sum_x2: f64 = series.iter().map(|x| x * x).sum();
    Ok(sum_x.mul_add(-sum_x / n, sum_x2) / (n - 1.0))
}

/// Sample standard deviation.
pub fn std_dev(series: &[f64]) -> Result<f64, MetricError> {
    variance(series).map(f64::sqrt)
}

/// Population-adjusted, annualized standard deviation:
/// `sqrt(var·(n−1)/n)·sqrt(scale)`.
pub fn annualized_sigma(series: &[f64], scale: f64) -> Result<f64, MetricError> {
    let n = series.len() as f64;
    let var = variance(series)?;
    Ok((var * (n - 1.0) / n).sqrt() * scale.sqrt())
}

/// Annualize a return series.
///
/// Geometric: `(Π(1+r))^(scale/n) − 1`. Arithmetic: `mean(r)·scale`.
///
/// # Errors
///
/// Returns `InsufficientData` for an empty series.
pub fn annualize(series: &[f64], scale: f64, geometric: bool) -> Result<f64, MetricError> {
    let n = series.len();
    if n == 0 {
        return Err(MetricError::insufficient("Annualized", 0, 0));
    }

    if geometric {
        let growth = product(&series.iter().map(|r| 1.0 + r).collect::<Vec<_>>());
        Ok(growth.powf(scale / n as f64) - 1.0)
    } else {
        Ok(average(series) * scale)
    }
}

/// Returns less a per-period `rate`.
pub fn excess(series: &[f64], rate: f64) -> Vec<f64> {
    add_scalar(series, -rate)
}

/// `exp(mean(ln(1+r))) − 1`
pub fn mean_geometric(series: &[f64]) -> Result<f64, MetricError> {
    if series.is_empty() {
        return Err(MetricError::insufficient("MeanGeometric", 0, 0));
    }
    let log_mean = series.iter().map(|r| r.ln_1p()).sum::<f64>() / series.len() as f64;
    Ok(log_mean.exp() - 1.0)
}

/// `mean(|r − mean(r)|)`
pub fn mean_absolute_deviation(series: &[f64]) -> Result<f64, MetricError> {
    if series.is_empty() {
        return Err(MetricError::insufficient("MeanAbsoluteDeviation", 0, 0));
    }
    let mean = average(series);
    Ok(series.iter().map(|r| (r - mean).abs()).sum::<f64>() / series.len() as f64)
}

/// Moment skewness.
///
/// # Errors
///
/// Returns `InsufficientData` when `n <= 2`.
pub fn skewness(series: &[f64]) -> Result<f64, MetricError> {
    let n = series.len();
    if n <= 2 {
        return Err(MetricError::insufficient("Skewness", 2, n));
    }

    let n = n as f64;
    let var = variance(series)?;
    let mean = average(series);
    let scale = (var * (n - 1.0) / n).powf(1.5);
    let cubed: f64 = series.iter().map(|r| (r - mean).powi(3) / scale).sum();
    Ok(cubed / n)
}

/// Sample excess kurtosis.
///
/// # Errors
///
/// Returns `InsufficientData` when `n <= 3`.
pub fn kurtosis(series: &[f64]) -> Result<f64, MetricError> {
    let n = series.len();
    if n <= 3 {
        return Err(MetricError::insufficient("Kurtosis", 3, n));
    }

    let n = n as f64;
    let var = variance(series)?;
    let mean = average(series);
    let fourth: f64 = series.iter().map(|r| (r - mean).powi(4) / (var * var)).sum();

    let bias = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    let excess = 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0));
    Ok(fourth.mul_add(bias, -excess))
}

/// Downside deviation below `mar`, normalized by the count of returns
/// below `mar` (subset method).
///
/// # Errors
///
/// Returns `DivisionDegenerate` when no return falls below `mar`.
pub fn downside_deviation(series: &[f64], mar: f64) -> Result<f64, MetricError> {
    let below: Vec<f64> = series.iter().copied().filter(|&r| r < mar).collect();
    if below.is_empty() {
        return Err(MetricError::degenerate(
            "DownsideDeviation2",
            "no returns below MAR",
        ));
    }

    let squared: f64 = below.iter().map(|r| (mar - r).powi(2)).sum();
    Ok((squared / below.len() as f64).sqrt())
}

/// Upside risk above `mar` (subset method), `0` when nothing exceeds `mar`.
pub fn upside_risk(series: &[f64], mar: f64) -> f64 {
    let (squared, count) = series
        .iter()
        .filter(|&&r| r > mar)
        .fold((0.0, 0_usize), |(acc, count), r| {
            ((r - mar).mul_add(r - mar, acc), count + 1)
        });

    if count == 0 {
        0.0
    } else {
        (squared / count as f64).sqrt()
    }
}

/// Kappa of order `l`: `(mean − mar) / LPM_l^(1/l)`.
///
/// # Errors
///
/// Returns `InsufficientData` for an empty series and `DivisionDegenerate`
/// when no return falls below `mar`.
pub fn kappa(series: &[f64], mar: f64, l: f64) -> Result<f64, MetricError> {
    if series.is_empty() {
        return Err(MetricError::insufficient("Kappa", 0, 0));
    }

    let n = series.len() as f64;
    let lpm: f64 = series
        .iter()
        .filter(|&&r| r < mar)
        .map(|r| (mar - r).powf(l))
        .sum::<f64>()
        / n;

    if lpm == 0.0 {
        return Err(MetricError::degenerate("Kappa", "no returns below MAR"));
    }

    Ok((average(series) - mar) / lpm.powf(1.0 / l))
}
