//! The closed set of metrics the engine can evaluate.

use serde::{Deserialize, Serialize};

/// A named performance metric.
///
/// [`Metric::name`] is the registry key callers pass to
/// [`CalculationContext::evaluate`](super::CalculationContext::evaluate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    // Return distribution
    /// Geometric annualized return.
    Annualized,
    /// Per-period geometric mean return.
    MeanGeometric,
    /// Sample variance of returns.
    Variance,
    /// Sample standard deviation of returns.
    StdDev,
    /// Annualized standard deviation.
    StdDevAnnualized,
    /// Annualized excess return over annualized volatility.
    SharpeRatio,
    /// Same value as `SharpeRatio`.
    SharpeRatioAnnualized,
    /// Moment skewness.
    Skewness,
    /// Sample excess kurtosis.
    Kurtosis,
    /// Sharpe ratio penalized for skewness and kurtosis.
    AdjustedSharpeRatio,
    /// Skewness over kurtosis.
    SkewnessKurtosisRatio,
    /// Mean absolute deviation from the mean return.
    MeanAbsoluteDeviation,
    /// Kelly fraction.
    KellyRatioFull,
    /// Half Kelly fraction.
    KellyRatioHalf,
    /// Share of returns above MAR.
    UpsideFrequency,
    /// Share of returns below MAR.
    DownsideFrequency,
    /// Loss mass times loss count over gain mass times gain count.
    DRatio,
    /// Gain mass over loss mass.
    BernardoLedoitRatio,

    // Downside and upside risk
    /// Downside deviation below MAR (subset method).
    DownsideDeviation,
    /// Mean excess over MAR per unit of downside deviation.
    SortinoRatio,
    /// Loss-averse mean excess per unit of downside deviation.
    ProspectRatio,
    /// Mean upside over MAR per unit of downside deviation.
    UpsidePotentialRatio,
    /// Upside deviation above MAR (subset method).
    UpsideRisk,
    /// Upside variance over downside variance.
    VolatilitySkewnessVariance,
    /// Upside risk over downside deviation.
    VolatilitySkewnessRisk,
    /// Excess over MAR per unit of lower partial moment.
    Kappa,

    // Drawdown
    /// Deepest drawdown, as a positive fraction.
    MaxDrawdown,
    /// Mean depth of underwater runs.
    AverageDrawdown,
    /// Mean length of underwater runs.
    AverageLength,
    /// Mean trough-to-end span of underwater runs.
    AverageRecovery,
    /// Annualized return over max drawdown.
    CalmarRatio,
    /// Annualized return over max drawdown plus an excess.
    SterlingRatio,
    /// Mean absolute drawdown.
    PainIndex,
    /// Annualized excess return over the pain index.
    PainRatio,
    /// Annualized excess return over root-sum-square drawdown episodes.
    BurkeRatio,

    // Benchmark relative
    /// Annualized portfolio minus annualized benchmark return.
    ActivePremium,
    /// Annualized volatility of active returns.
    TrackingError,
    /// Active premium over tracking error.
    InformationRatio,
    /// Portfolio return levered to benchmark volatility.
    MSquared,
    /// M-squared minus benchmark annualized return.
    MSquaredExcess,
    /// Jensen's alpha, annualized.
    JensenAlpha,
    /// Annualized excess return per unit of beta.
    TreynorRatio,
    /// Jensen's alpha normalized by the configured risk measure.
    AppraisalRatio,
    /// Annualized residual volatility.
    SpecificRisk,
    /// Beta times annualized benchmark volatility.
    SystematicRisk,
    /// Root-sum-square of systematic and specific risk.
    TotalRisk,
    /// Portfolio volatility over benchmark volatility.
    FamaBeta,
    /// Upside capture ratio.
    UpDownRatios,
    /// Sortino-based M-squared.
    M2Sortino,
    /// Annualized return less downside-variance penalty.
    OmegaExcessReturn,
}

impl Metric {
    /// Every metric, in catalog order.
    pub const ALL: [Self; 50] = [
        Self::Annualized,
        Self::MeanGeometric,
        Self::Variance,
        Self::StdDev,
        Self::StdDevAnnualized,
        Self::SharpeRatio,
        Self::SharpeRatioAnnualized,
        Self::Skewness,
        Self::Kurtosis,
        Self::AdjustedSharpeRatio,
        Self::SkewnessKurtosisRatio,
        Self::MeanAbsoluteDeviation,
        Self::KellyRatioFull,
        Self::KellyRatioHalf,
        Self::UpsideFrequency,
        Self::DownsideFrequency,
        Self::DRatio,
        Self::BernardoLedoitRatio,
        Self::DownsideDeviation,
        Self::SortinoRatio,
        Self::ProspectRatio,
        Self::UpsidePotentialRatio,
        Self::UpsideRisk,
        Self::VolatilitySkewnessVariance,
        Self::VolatilitySkewnessRisk,
        Self::Kappa,
        Self::MaxDrawdown,
        Self::AverageDrawdown,
        Self::AverageLength,
        Self::AverageRecovery,
        Self::CalmarRatio,
        Self::SterlingRatio,
        Self::PainIndex,
        Self::PainRatio,
        Self::BurkeRatio,
        Self::ActivePremium,
        Self::TrackingError,
        Self::InformationRatio,
        Self::MSquared,
        Self::MSquaredExcess,
        Self::JensenAlpha,
        Self::TreynorRatio,
        Self::AppraisalRatio,
        Self::SpecificRisk,
        Self::SystematicRisk,
        Self::TotalRisk,
        Self::FamaBeta,
        Self::UpDownRatios,
        Self::M2Sortino,
        Self::OmegaExcessReturn,
    ];

    /// Registry name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Annualized => "Annualized",
            Self::MeanGeometric => "MeanGeometric",
            Self::Variance => "Variance",
            Self::StdDev => "StdDev",
            Self::StdDevAnnualized => "StdDev_Annualized",
            Self::SharpeRatio => "SharpeRatio",
            Self::SharpeRatioAnnualized => "SharpeRatio_Annualized",
            Self::Skewness => "Skewness",
            Self::Kurtosis => "Kurtosis",
            Self::AdjustedSharpeRatio => "AdjustedSharpeRatio",
            Self::SkewnessKurtosisRatio => "SkewnessKurtosisRatio",
            Self::MeanAbsoluteDeviation => "MeanAbsoluteDeviation",
            Self::KellyRatioFull => "KellyRatio_Full",
            Self::KellyRatioHalf => "KellyRatio_Half",
            Self::UpsideFrequency => "UpsideFrequency",
            Self::DownsideFrequency => "DownsideFrequency2",
            Self::DRatio => "DRatio",
            Self::BernardoLedoitRatio => "BernardoLedoitRatio",
            Self::DownsideDeviation => "DownsideDeviation2",
            Self::SortinoRatio => "SortinoRatio",
            Self::ProspectRatio => "ProspectRatio",
            Self::UpsidePotentialRatio => "UpsidePotentialRatio",
            Self::UpsideRisk => "UpsideRisk",
            Self::VolatilitySkewnessVariance => "VolatilitySkewness_Variance",
            Self::VolatilitySkewnessRisk => "VolatilitySkewness_Risk",
            Self::Kappa => "Kappa",
            Self::MaxDrawdown => "MaxDrawdown",
            Self::AverageDrawdown => "AverageDrawdown",
            Self::AverageLength => "AverageLength",
            Self::AverageRecovery => "AverageRecovery",
            Self::CalmarRatio => "CalmarRatio",
            Self::SterlingRatio => "SterlingRatio",
            Self::PainIndex => "PainIndex",
            Self::PainRatio => "PainRatio",
            Self::BurkeRatio => "BurkeRatio",
            Self::ActivePremium => "ActivePremium",
            Self::TrackingError => "TrackingError",
            Self::InformationRatio => "InformationRatio",
            Self::MSquared => "MSquared",
            Self::MSquaredExcess => "MSquaredExcess",
            Self::JensenAlpha => "JensenAlpha2",
            Self::TreynorRatio => "TreynorRatio",
            Self::AppraisalRatio => "AppraisalRatio",
            Self::SpecificRisk => "SpecificRisk",
            Self::SystematicRisk => "SystematicRisk",
            Self::TotalRisk => "TotalRisk",
            Self::FamaBeta => "FamaBeta",
            Self::UpDownRatios => "UpDownRatios",
            Self::M2Sortino => "M2Sortino",
            Self::OmegaExcessReturn => "OmegaExcessReturn",
        }
    }

    /// Whether the metric needs a benchmark series.
    #[must_use]
    pub const fn requires_benchmark(&self) -> bool {
        matches!(
            self,
            Self::ActivePremium
                | Self::TrackingError
                | Self::InformationRatio
                | Self::MSquared
                | Self::MSquaredExcess
                | Self::JensenAlpha
                | Self::TreynorRatio
                | Self::AppraisalRatio
                | Self::SpecificRisk
                | Self::SystematicRisk
                | Self::TotalRisk
                | Self::FamaBeta
                | Self::UpDownRatios
                | Self::M2Sortino
                | Self::OmegaExcessReturn
        )
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
