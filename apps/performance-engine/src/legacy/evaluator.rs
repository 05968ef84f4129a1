//! Window-based evaluation of the core metric set.
//!
//! Each call rebuilds its windows from scratch and recomputes every input it
//! needs; nothing is shared between metrics. This is slow on purpose: the
//! formulas are written independently of the engine so the two paths can
//! be checked against each other.

use chrono::{DateTime, Utc};

use crate::config::{AppraisalMethod, MetricConfig};
use crate::error::MetricError;
use crate::periodicity::{self, Frequency};

use super::window::SlidingWindow;

/// Names the legacy path evaluates.
pub const LEGACY_METRICS: [&str; 38] = [
    "Annualized",
    "MeanGeometric",
    "Variance",
    "StdDev",
    "StdDev_Annualized",
    "SharpeRatio",
    "Skewness",
    "Kurtosis",
    "AdjustedSharpeRatio",
    "MaxDrawdown",
    "AverageDrawdown",
    "AverageLength",
    "AverageRecovery",
    "UpsideFrequency",
    "DownsideDeviation2",
    "SortinoRatio",
    "ProspectRatio",
    "UpsidePotentialRatio",
    "UpsideRisk",
    "KellyRatio_Full",
    "DRatio",
    "BernardoLedoitRatio",
    "CalmarRatio",
    "SterlingRatio",
    "PainIndex",
    "PainRatio",
    "Kappa",
    "BurkeRatio",
    "ActivePremium",
    "TrackingError",
    "InformationRatio",
    "MSquared",
    "JensenAlpha2",
    "TreynorRatio",
    "AppraisalRatio",
    "SpecificRisk",
    "SystematicRisk",
    "TotalRisk",
];

/// Evaluator over raw value arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyEvaluator {
    config: MetricConfig,
}

/// Portfolio returns and per-period rates for one call. The benchmark stays
/// raw until a relative metric asks for it.
struct Inputs<'a> {
    ra: SlidingWindow,
    scale: f64,
    mar: f64,
    rf: f64,
    resampled: bool,
    bench: Option<&'a [f64]>,
    timestamps: &'a [DateTime<Utc>],
}

impl LegacyEvaluator {
    /// Create an evaluator with the given rates and options.
    #[must_use]
    pub const fn new(config: MetricConfig) -> Self {
        Self { config }
    }

    /// Whether `name` is evaluated by this path.
    #[must_use]
    pub fn supports(name: &str) -> bool {
        LEGACY_METRICS.iter().any(|&n| n == name)
    }

    /// Evaluate `name` over raw portfolio (and benchmark) values.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMetric` for names outside [`LEGACY_METRICS`], and the
    /// metric's own failure otherwise.
    pub fn evaluate(
        &self,
        name: &str,
        portfolio: &[f64],
        bench: Option<&[f64]>,
        timestamps: &[DateTime<Utc>],
    ) -> Result<f64, MetricError> {
        let Some(&metric) = LEGACY_METRICS.iter().find(|&&n| n == name) else {
            return Err(MetricError::UnknownMetric(name.to_string()));
        };
        let inputs = self.prepare(portfolio, bench, timestamps)?;
        self.dispatch(metric, &inputs)
    }

    fn prepare<'a>(
        &self,
        portfolio: &[f64],
        bench: Option<&'a [f64]>,
        timestamps: &'a [DateTime<Utc>],
    ) -> Result<Inputs<'a>, MetricError> {
        if !timestamps.is_empty() && timestamps.len() != portfolio.len() {
            return Err(MetricError::invalid_input(
                "timestamps and portfolio differ in length",
            ));
        }

        let frequency = Frequency::infer(timestamps);
        let resampled = frequency == Some(Frequency::Minute);
        let (values, scale) = if resampled {
            let hours = self.config.day_boundary_hours;
            let values = periodicity::resample_to_daily(timestamps, portfolio, hours)?;
            (values, Frequency::Day.periods_per_year())
        } else {
            let scale = frequency.map_or(self.config.scale, |f| f.periods_per_year());
            (portfolio.to_vec(), scale)
        };

        Ok(Inputs {
            ra: discrete_returns(&SlidingWindow::from_slice(&values)?)?,
            scale,
            mar: self.config.mar / scale,
            rf: self.config.risk_free_rate / scale,
            resampled,
            bench,
            timestamps,
        })
    }

    fn bench_returns(&self, bench: &[f64], x: &Inputs) -> Result<SlidingWindow, MetricError> {
        let values = if x.resampled {
            periodicity::resample_to_daily(x.timestamps, bench, self.config.day_boundary_hours)?
        } else {
            bench.to_vec()
        };
        discrete_returns(&SlidingWindow::from_slice(&values)?)
    }

    fn dispatch(&self, metric: &'static str, x: &Inputs) -> Result<f64, MetricError> {
        let ra = &x.ra;
        let rf_annual = self.config.risk_free_rate;

        match metric {
            "Annualized" => annualized(ra, x.scale),
            "MeanGeometric" => {
                let log_mean = ra.iter().map(|r| (1.0 + r).ln()).sum::<f64>() / ra.len() as f64;
                Ok(log_mean.exp() - 1.0)
            }
            "Variance" => variance(ra),
            "StdDev" => variance(ra).map(f64::sqrt),
            "StdDev_Annualized" => std_dev_annualized(ra, x.scale),
            "SharpeRatio" => sharpe(ra, x.rf, x.scale),
            "Skewness" => skewness(ra),
            "Kurtosis" => kurtosis(ra),
            "AdjustedSharpeRatio" => {
                let sr = (annualized(ra, x.scale)? - rf_annual) / std_dev_annualized(ra, x.scale)?;
                let s = skewness(ra)?;
                let k = kurtosis(ra)?;
                Ok(sr * (1.0 + (s / 6.0) * sr - ((k - 3.0) / 24.0) * sr * sr))
            }
            "MaxDrawdown" => max_drawdown(ra),
            "AverageDrawdown" => average_run(ra, |run| run.depth).map(f64::abs),
            "AverageLength" => average_run(ra, |run| run.length),
            "AverageRecovery" => average_run(ra, |run| run.recovery),
            "UpsideFrequency" => {
                let above = ra.iter().filter(|&r| r > x.mar).count();
                Ok(above as f64 / ra.len() as f64)
            }
            "DownsideDeviation2" => downside_deviation(ra, x.mar),
            "SortinoRatio" => Ok((ra.average() - x.mar) / downside_deviation(ra, x.mar)?),
            "ProspectRatio" => {
                let weight = self.config.prospect_loss_weight;
                let mut total = 0.0;
                for r in ra.iter() {
                    total += if r > 0.0 { r } else { weight * r };
                }
                Ok((total / ra.len() as f64 - x.mar) / downside_deviation(ra, x.mar)?)
            }
            "UpsidePotentialRatio" => {
                let dd = downside_deviation(ra, x.mar)?;
                let above: Vec<f64> = ra.iter().filter(|&r| r > x.mar).collect();
                if above.is_empty() {
                    return Err(MetricError::degenerate(metric, "no returns above MAR"));
                }
                let mean_excess =
                    above.iter().map(|r| r - x.mar).sum::<f64>() / above.len() as f64;
                Ok(mean_excess / dd)
            }
            "UpsideRisk" => Ok(upside_risk(ra, x.mar)),
            "KellyRatio_Full" => Ok((ra.average() - x.rf) / variance(ra)?),
            "DRatio" => {
                let (gain, n_gain, loss, n_loss) = gain_loss(ra);
                Ok(-(loss * n_loss) / (gain * n_gain))
            }
            "BernardoLedoitRatio" => {
                let (gain, _, loss, _) = gain_loss(ra);
                Ok(-gain / loss)
            }
            "CalmarRatio" => Ok(annualized(ra, x.scale)? / max_drawdown(ra)?.abs()),
            "SterlingRatio" => {
                let denominator = (max_drawdown(ra)? + self.config.sterling_excess).abs();
                if denominator < 1e-7 {
                    return Err(MetricError::degenerate(metric, "denominator below 1e-7"));
                }
                Ok(annualized(ra, x.scale)? / denominator)
            }
            "PainIndex" => pain_index(ra),
            "PainRatio" => Ok((annualized(ra, x.scale)? - rf_annual) / pain_index(ra)?),
            "Kappa" => {
                let l = self.config.kappa_order;
                let lpm = ra
                    .iter()
                    .filter(|&r| r < x.mar)
                    .map(|r| (x.mar - r).powf(l))
                    .sum::<f64>()
                    / ra.len() as f64;
                Ok((ra.average() - x.mar) / lpm.powf(1.0 / l))
            }
            "BurkeRatio" => self.burke(ra, x.scale),
            _ => self.dispatch_relative(metric, x),
        }
    }

    fn dispatch_relative(&self, metric: &'static str, x: &Inputs) -> Result<f64, MetricError> {
        let ra = &x.ra;
        let bench = x.bench.ok_or(MetricError::BenchmarkRequired { metric })?;
        let rb = &self.bench_returns(bench, x)?;
        let rf_annual = self.config.risk_free_rate;

        match metric {
            "ActivePremium" => Ok(annualized(ra, x.scale)? - annualized(rb, x.scale)?),
            "TrackingError" => tracking_error(ra, rb, x.scale),
            "InformationRatio" => {
                let premium = annualized(ra, x.scale)? - annualized(rb, x.scale)?;
                Ok(premium / tracking_error(ra, rb, x.scale)?)
            }
            "MSquared" => {
                let n = ra.len() as f64;
                let sigma_p = (variance(ra)? * (n - 1.0) / n).sqrt() * x.scale.sqrt();
                let sigma_b = (variance(rb)? * (n - 1.0) / n).sqrt() * x.scale.sqrt();
                Ok((annualized(ra, x.scale)? - rf_annual) * sigma_b / sigma_p + rf_annual)
            }
            "JensenAlpha2" => jensen_alpha(ra, rb, x, rf_annual),
            "TreynorRatio" => {
                let (_, beta) = alpha_beta(ra, rb, x.rf);
                Ok(annualized(&shift(ra, -x.rf)?, x.scale)? / beta)
            }
            "AppraisalRatio" => {
                let alpha = jensen_alpha(ra, rb, x, rf_annual)?;
                match self.config.appraisal_method {
                    AppraisalMethod::Appraisal => Ok(alpha / specific_risk(ra, rb, x)),
                    AppraisalMethod::Modified => Ok(alpha / alpha_beta(ra, rb, x.rf).1),
                    AppraisalMethod::Alternative => Ok(alpha / systematic_risk(ra, rb, x)?),
                }
            }
            "SpecificRisk" => Ok(specific_risk(ra, rb, x)),
            "SystematicRisk" => systematic_risk(ra, rb, x),
            "TotalRisk" => {
                let systematic = systematic_risk(ra, rb, x)?;
                let specific = specific_risk(ra, rb, x);
                Ok((systematic * systematic + specific * specific).sqrt())
            }
            _ => Err(MetricError::UnknownMetric(metric.to_string())),
        }
    }

    /// Episodes are stretches of negative returns, compounded from the
    /// sample after the peak. With no episode the ratio is `0`.
    fn burke(&self, ra: &SlidingWindow, scale: f64) -> Result<f64, MetricError> {
        let data = ra.to_vec();
        let n = data.len();
        let mut episodes = Vec::new();
        let mut peak: Option<usize> = None;

        for i in 1..n {
            if data[i] < 0.0 {
                if peak.is_none() {
                    peak = Some(i - 1);
                }
            } else if let Some(p) = peak.take() {
                episodes.push(data[p + 1..i].iter().map(|r| 1.0 + r).product::<f64>() - 1.0);
            }
        }
        if let Some(p) = peak {
            episodes.push(data[p + 1..n].iter().map(|r| 1.0 + r).product::<f64>() - 1.0);
        }

        let mut result = 0.0;
        if !episodes.is_empty() {
            let rss = episodes.iter().map(|d| d * d).sum::<f64>().sqrt();
            result = (annualized(ra, scale)? - self.config.risk_free_rate) / rss;
        }
        if self.config.burke_modified {
            result *= (n as f64).sqrt();
        }
        Ok(result)
    }
}

// =============================================================================
// Window formulas
// =============================================================================

fn discrete_returns(prices: &SlidingWindow) -> Result<SlidingWindow, MetricError> {
    let data = prices.to_vec();
    let mut returns = SlidingWindow::new(data.len())?;
    returns.push(0.0);
    for pair in data.windows(2) {
        returns.push(if pair[0] == 0.0 { 0.0 } else { pair[1] / pair[0] - 1.0 });
    }
    Ok(returns)
}

fn shift(window: &SlidingWindow, by: f64) -> Result<SlidingWindow, MetricError> {
    let shifted: Vec<f64> = window.iter().map(|r| r + by).collect();
    SlidingWindow::from_slice(&shifted)
}

fn annualized(window: &SlidingWindow, scale: f64) -> Result<f64, MetricError> {
    if window.is_empty() {
        return Err(MetricError::insufficient("Annualized", 0, 0));
    }
    let mut growth = 1.0;
    for r in window.iter() {
        growth *= 1.0 + r;
    }
    Ok(growth.powf(scale / window.len() as f64) - 1.0)
}

fn variance(window: &SlidingWindow) -> Result<f64, MetricError> {
    let n = window.len();
    if n <= 1 {
        return Err(MetricError::insufficient("Variance", 1, n));
    }
    let mean = window.average();
    let total: f64 = window.iter().map(|r| (r - mean) * (r - mean)).sum();
    Ok(total / (n - 1) as f64)
}

fn std_dev_annualized(window: &SlidingWindow, scale: f64) -> Result<f64, MetricError> {
    Ok(variance(window)?.sqrt() * scale.sqrt())
}

fn sharpe(window: &SlidingWindow, rf: f64, scale: f64) -> Result<f64, MetricError> {
    Ok(annualized(&shift(window, -rf)?, scale)? / std_dev_annualized(window, scale)?)
}

fn skewness(window: &SlidingWindow) -> Result<f64, MetricError> {
    let n = window.len();
    if n <= 2 {
        return Err(MetricError::insufficient("Skewness", 2, n));
    }
    let n = n as f64;
    let var = variance(window)?;
    let mean = window.average();
    let norm = (var * (n - 1.0) / n).powf(1.5);
    Ok(window.iter().map(|r| (r - mean).powi(3) / norm).sum::<f64>() / n)
}

fn kurtosis(window: &SlidingWindow) -> Result<f64, MetricError> {
    let n = window.len();
    if n <= 3 {
        return Err(MetricError::insufficient("Kurtosis", 3, n));
    }
    let n = n as f64;
    let var = variance(window)?;
    let mean = window.average();
    let total: f64 = window.iter().map(|r| (r - mean).powi(4) / var.powi(2)).sum();
    Ok(total * n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0))
        - 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
}

fn drawdowns(window: &SlidingWindow) -> Result<Vec<f64>, MetricError> {
    let Some(first) = window.first() else {
        return Err(MetricError::EmptySeries);
    };
    let mut current = 1.0;
    let mut peak = 1.0 + first;
    let mut result = Vec::with_capacity(window.len());
    for r in window.iter() {
        current *= 1.0 + r;
        if current > peak {
            peak = current;
        }
        result.push(current / peak - 1.0);
    }
    Ok(result)
}

fn max_drawdown(window: &SlidingWindow) -> Result<f64, MetricError> {
    let dd = drawdowns(window)?;
    let worst = dd.iter().copied().fold(dd[0], f64::min);
    Ok(if worst < 0.0 { -worst } else { 0.0 })
}

fn pain_index(window: &SlidingWindow) -> Result<f64, MetricError> {
    let dd = drawdowns(window)?;
    Ok(dd.iter().map(|d| d.abs()).sum::<f64>() / dd.len() as f64)
}

struct Run {
    depth: f64,
    length: f64,
    recovery: f64,
}

/// Same-sign runs of the drawdown series.
fn find_runs(window: &SlidingWindow) -> Result<Vec<Run>, MetricError> {
    let dd = drawdowns(window)?;
    let mut runs = Vec::new();

    let mut prior_underwater = dd[0] < 0.0;
    let (mut from, mut to, mut trough) = (0_usize, 1_usize, 0_usize);
    let mut so_far = dd[0];

    for (i, &d) in dd.iter().enumerate().skip(1) {
        let underwater = d < 0.0;
        if underwater == prior_underwater {
            if d < so_far {
                so_far = d;
                trough = i;
            }
            to = i + 1;
        } else {
            runs.push(Run {
                depth: so_far,
                length: (to - from + 1) as f64,
                recovery: (to - trough) as f64,
            });
            from = i;
            to = i + 1;
            trough = i;
            so_far = d;
            prior_underwater = underwater;
        }
    }
    runs.push(Run {
        depth: so_far,
        length: (to - from + 1) as f64,
        recovery: (to - trough) as f64,
    });

    Ok(runs)
}

fn average_run(window: &SlidingWindow, field: impl Fn(&Run) -> f64) -> Result<f64, MetricError> {
    let runs = find_runs(window)?;
    let underwater: Vec<&Run> = runs.iter().filter(|run| run.depth < 0.0).collect();
    if underwater.is_empty() {
        return Err(MetricError::NoDrawdownRuns);
    }
    Ok(underwater.iter().map(|run| field(run)).sum::<f64>() / underwater.len() as f64)
}

fn downside_deviation(window: &SlidingWindow, mar: f64) -> Result<f64, MetricError> {
    let mut total = 0.0;
    let mut count = 0_u32;
    for r in window.iter().filter(|&r| r < mar) {
        total += (mar - r) * (mar - r);
        count += 1;
    }
    if count == 0 {
        return Err(MetricError::degenerate(
            "DownsideDeviation2",
            "no returns below MAR",
        ));
    }
    Ok((total / f64::from(count)).sqrt())
}

fn upside_risk(window: &SlidingWindow, mar: f64) -> f64 {
    let above: Vec<f64> = window.iter().filter(|&r| r > mar).collect();
    if above.is_empty() {
        return 0.0;
    }
    (above.iter().map(|r| (r - mar) * (r - mar)).sum::<f64>() / above.len() as f64).sqrt()
}

/// `(Σgain, #gain, Σloss, #loss)`
fn gain_loss(window: &SlidingWindow) -> (f64, f64, f64, f64) {
    let (mut gain, mut n_gain, mut loss, mut n_loss) = (0.0, 0.0, 0.0, 0.0);
    for r in window.iter() {
        if r > 0.0 {
            gain += r;
            n_gain += 1.0;
        } else if r < 0.0 {
            loss += r;
            n_loss += 1.0;
        }
    }
    (gain, n_gain, loss, n_loss)
}

fn tracking_error(ra: &SlidingWindow, rb: &SlidingWindow, scale: f64) -> Result<f64, MetricError> {
    if ra.len() != rb.len() {
        return Err(MetricError::invalid_input(
            "TrackingError: portfolio and bench differ in length",
        ));
    }
    let diff: Vec<f64> = ra.iter().zip(rb.iter()).map(|(a, b)| a - b).collect();
    Ok((variance(&SlidingWindow::from_slice(&diff)?)? * scale).sqrt())
}

/// Centered OLS of excess portfolio on excess benchmark returns.
fn alpha_beta(ra: &SlidingWindow, rb: &SlidingWindow, rf: f64) -> (f64, f64) {
    let y: Vec<f64> = ra.iter().map(|r| r - rf).collect();
    let x: Vec<f64> = rb.iter().map(|r| r - rf).collect();
    let n = x.len().min(y.len());
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }

    let x_mean = x[..n].iter().sum::<f64>() / n as f64;
    let y_mean = y[..n].iter().sum::<f64>() / n as f64;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (xi, yi) in x.iter().zip(&y) {
        sxy += (xi - x_mean) * (yi - y_mean);
        sxx += (xi - x_mean) * (xi - x_mean);
    }
    let beta = if sxx == 0.0 { f64::NAN } else { sxy / sxx };
    (y_mean - beta * x_mean, beta)
}

fn jensen_alpha(
    ra: &SlidingWindow,
    rb: &SlidingWindow,
    x: &Inputs,
    rf_annual: f64,
) -> Result<f64, MetricError> {
    let (_, beta) = alpha_beta(ra, rb, x.rf);
    let rp = annualized(ra, x.scale)?;
    let rm = annualized(rb, x.scale)?;
    Ok(rp - rf_annual - beta * (rm - rf_annual))
}

fn specific_risk(ra: &SlidingWindow, rb: &SlidingWindow, x: &Inputs) -> f64 {
    let (alpha, beta) = alpha_beta(ra, rb, x.rf);
    let eps: Vec<f64> = ra
        .iter()
        .zip(rb.iter())
        .map(|(a, b)| (a - x.rf) - beta * (b - x.rf) - alpha)
        .collect();
    let mean = eps.iter().sum::<f64>() / eps.len() as f64;
    let spread = eps.iter().map(|e| (e - mean) * (e - mean)).sum::<f64>() / eps.len() as f64;
    spread.sqrt() * x.scale.sqrt()
}

fn systematic_risk(ra: &SlidingWindow, rb: &SlidingWindow, x: &Inputs) -> Result<f64, MetricError> {
    let (_, beta) = alpha_beta(ra, rb, x.rf);
    Ok(beta * (variance(&shift(rb, -x.rf)?)? * x.scale).sqrt())
}
