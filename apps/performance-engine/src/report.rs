//! Serializable snapshot of evaluated metrics.
//!
//! A report never fails as a whole: each metric carries either its value or
//! `NaN` together with the error kind and message that produced it. JSON
//! output renders `NaN` as `null`.

use serde::Serialize;

use crate::engine::CalculationContext;
use crate::error::ErrorKind;

/// Outcome of a single metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    /// Registry name.
    pub name: String,
    /// Computed value, `NaN` on failure.
    pub value: f64,
    /// Error kind when evaluation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    /// Error message when evaluation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MetricValue {
    /// Whether the metric evaluated successfully.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Metrics evaluated against one context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReport {
    /// Periods per year of the input series.
    pub period: f64,
    /// Annualization scale applied to the evaluated returns.
    pub scale: f64,
    /// Whether minute data was resampled to daily.
    pub resampled: bool,
    /// One entry per requested name, in request order.
    pub metrics: Vec<MetricValue>,
}

impl MetricReport {
    /// Evaluate `names` against `ctx`.
    pub fn evaluate<S: AsRef<str>>(ctx: &CalculationContext, names: &[S]) -> Self {
        let metrics = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                match ctx.evaluate(name) {
                    Ok(value) => MetricValue {
                        name: name.to_string(),
                        value,
                        error: None,
                        message: None,
                    },
                    Err(e) => MetricValue {
                        name: name.to_string(),
                        value: f64::NAN,
                        error: Some(e.kind()),
                        message: Some(e.to_string()),
                    },
                }
            })
            .collect();

        Self {
            period: ctx.period(),
            scale: ctx.scale(),
            resampled: ctx.is_resampled(),
            metrics,
        }
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Value of `name`, `NaN` when absent or failed.
    #[must_use]
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).map_or(f64::NAN, |m| m.value)
    }

    /// Entries that failed.
    pub fn failures(&self) -> impl Iterator<Item = &MetricValue> {
        self.metrics.iter().filter(|m| !m.is_ok())
    }

    /// Render as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
