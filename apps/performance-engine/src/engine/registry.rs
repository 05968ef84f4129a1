//! Name-to-function lookup table for metrics.
//!
//! The table is built once per process on first use and never mutated
//! afterwards, so it can be shared freely across threads even though the
//! contexts it evaluates cannot.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::MetricError;

use super::catalog::Metric;
use super::context::CalculationContext;
use super::metrics::{distribution, downside, drawdown, relative};

/// Signature shared by every metric function.
pub type MetricFn = fn(&CalculationContext) -> Result<f64, MetricError>;

/// A registered metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricEntry {
    /// Catalog identity, used as the cache key.
    pub metric: Metric,
    /// Computation.
    pub compute: MetricFn,
}

/// Immutable registry of every evaluable metric.
#[derive(Debug)]
pub struct MetricRegistry {
    entries: HashMap<&'static str, MetricEntry>,
}

impl MetricRegistry {
    /// Process-wide registry.
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<MetricRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::build)
    }

    fn build() -> Self {
        let entries = Metric::ALL
            .iter()
            .map(|&metric| {
                (
                    metric.name(),
                    MetricEntry {
                        metric,
                        compute: compute_fn(metric),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Look up a metric by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMetric` when `name` is not registered.
    pub fn get(&self, name: &str) -> Result<MetricEntry, MetricError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| MetricError::UnknownMetric(name.to_string()))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computation behind each catalog entry.
pub(crate) const fn compute_fn(metric: Metric) -> MetricFn {
    match metric {
        Metric::Annualized => distribution::annualized,
        Metric::MeanGeometric => distribution::mean_geometric,
        Metric::Variance => distribution::variance,
        Metric::StdDev => distribution::std_dev,
        Metric::StdDevAnnualized => distribution::std_dev_annualized,
        Metric::SharpeRatio => distribution::sharpe_ratio,
        Metric::SharpeRatioAnnualized => distribution::sharpe_ratio_annualized,
        Metric::Skewness => distribution::skewness,
        Metric::Kurtosis => distribution::kurtosis,
        Metric::AdjustedSharpeRatio => distribution::adjusted_sharpe_ratio,
        Metric::SkewnessKurtosisRatio => distribution::skewness_kurtosis_ratio,
        Metric::MeanAbsoluteDeviation => distribution::mean_absolute_deviation,
        Metric::KellyRatioFull => distribution::kelly_ratio_full,
        Metric::KellyRatioHalf => distribution::kelly_ratio_half,
        Metric::UpsideFrequency => distribution::upside_frequency,
        Metric::DownsideFrequency => distribution::downside_frequency,
        Metric::DRatio => distribution::d_ratio,
        Metric::BernardoLedoitRatio => distribution::bernardo_ledoit_ratio,
        Metric::DownsideDeviation => downside::downside_deviation,
        Metric::SortinoRatio => downside::sortino_ratio,
        Metric::ProspectRatio => downside::prospect_ratio,
        Metric::UpsidePotentialRatio => downside::upside_potential_ratio,
        Metric::UpsideRisk => downside::upside_risk,
        Metric::VolatilitySkewnessVariance => downside::volatility_skewness_variance,
        Metric::VolatilitySkewnessRisk => downside::volatility_skewness_risk,
        Metric::Kappa => downside::kappa,
        Metric::MaxDrawdown => drawdown::max_drawdown,
        Metric::AverageDrawdown => drawdown::average_drawdown,
        Metric::AverageLength => drawdown::average_length,
        Metric::AverageRecovery => drawdown::average_recovery,
        Metric::CalmarRatio => drawdown::calmar_ratio,
        Metric::SterlingRatio => drawdown::sterling_ratio,
        Metric::PainIndex => drawdown::pain_index,
        Metric::PainRatio => drawdown::pain_ratio,
        Metric::BurkeRatio => drawdown::burke_ratio,
        Metric::ActivePremium => relative::active_premium,
        Metric::TrackingError => relative::tracking_error,
        Metric::InformationRatio => relative::information_ratio,
        Metric::MSquared => relative::m_squared,
        Metric::MSquaredExcess => relative::m_squared_excess,
        Metric::JensenAlpha => relative::jensen_alpha,
        Metric::TreynorRatio => relative::treynor_ratio,
        Metric::AppraisalRatio => relative::appraisal_ratio,
        Metric::SpecificRisk => relative::specific_risk,
        Metric::SystematicRisk => relative::systematic_risk,
        Metric::TotalRisk => relative::total_risk,
        Metric::FamaBeta => relative::fama_beta,
        Metric::UpDownRatios => relative::up_down_ratios,
        Metric::M2Sortino => relative::m2_sortino,
        Metric::OmegaExcessReturn => relative::omega_excess_return,
    }
}
