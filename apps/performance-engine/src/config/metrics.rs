//! Rate assumptions and metric options.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Default minimum acceptable return (annual).
pub const DEFAULT_MAR: f64 = 0.03;

/// Default risk-free rate (annual).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03;

/// Default annualization scale (trading days per year).
pub const DEFAULT_SCALE: f64 = 252.0;

/// How `AppraisalRatio` normalizes Jensen's alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppraisalMethod {
    /// Alpha divided by specific risk.
    Appraisal,
    /// Alpha divided by beta.
    #[default]
    Modified,
    /// Alpha divided by systematic risk.
    Alternative,
}

/// Parameters shared by every metric evaluated in a context.
///
/// Annual rates are converted to per-period rates by dividing by the
/// context's scale, so the same config works for daily, monthly and
/// quarterly series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Minimum acceptable return, annual.
    #[serde(default = "default_mar")]
    pub mar: f64,
    /// Risk-free rate, annual.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Periods per year used when no periodicity can be inferred.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Excess added to max drawdown in the Sterling denominator.
    #[serde(default = "default_sterling_excess")]
    pub sterling_excess: f64,
    /// Order of the lower partial moment used by `Kappa`.
    #[serde(default = "default_kappa_order")]
    pub kappa_order: f64,
    /// Weight applied to losses by `ProspectRatio`.
    #[serde(default = "default_prospect_loss_weight")]
    pub prospect_loss_weight: f64,
    /// Multiply the Burke ratio by the square root of the sample count.
    #[serde(default = "default_true")]
    pub burke_modified: bool,
    /// Denominator used by `AppraisalRatio`.
    #[serde(default)]
    pub appraisal_method: AppraisalMethod,
    /// Gap (hours) that separates trading days when resampling minute data.
    #[serde(default = "default_day_boundary_hours")]
    pub day_boundary_hours: f64,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            mar: DEFAULT_MAR,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            scale: DEFAULT_SCALE,
            sterling_excess: default_sterling_excess(),
            kappa_order: default_kappa_order(),
            prospect_loss_weight: default_prospect_loss_weight(),
            burke_modified: true,
            appraisal_method: AppraisalMethod::Modified,
            day_boundary_hours: default_day_boundary_hours(),
        }
    }
}

const fn default_mar() -> f64 {
    DEFAULT_MAR
}

const fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

const fn default_scale() -> f64 {
    DEFAULT_SCALE
}

const fn default_sterling_excess() -> f64 {
    0.1 // 10%
}

const fn default_kappa_order() -> f64 {
    1.0
}

const fn default_prospect_loss_weight() -> f64 {
    2.25
}

const fn default_day_boundary_hours() -> f64 {
    10.0
}
