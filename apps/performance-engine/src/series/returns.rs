//! Value-to-return transforms.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// How consecutive values are turned into a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReturnMethod {
    /// `v[i] / v[i-1] - 1`
    #[default]
    Discrete,
    /// `ln(v[i] / v[i-1])`
    Log,
}

impl ReturnMethod {
    /// Method name as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Discrete => "discrete",
            Self::Log => "log",
        }
    }
}

impl FromStr for ReturnMethod {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discrete" => Ok(Self::Discrete),
            "log" => Ok(Self::Log),
            other => Err(MetricError::invalid_input(format!(
                "unknown return method '{other}', expected 'discrete' or 'log'"
            ))),
        }
    }
}

/// Derive a return series from a value series.
///
/// The result has the same length as `values` and starts at `0`. A zero
/// prior value yields a `0` return instead of an infinity.
///
/// # Errors
///
/// Returns `InvalidInput` for an empty value series.
pub fn returns(values: &[f64], method: ReturnMethod) -> Result<Vec<f64>, MetricError> {
    if values.is_empty() {
        return Err(MetricError::invalid_input("value series is empty"));
    }

    let mut result = Vec::with_capacity(values.len());
    result.push(0.0);

    for pair in values.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        let r = if prev == 0.0 {
            0.0
        } else {
            match method {
                ReturnMethod::Discrete => cur / prev - 1.0,
                ReturnMethod::Log => (cur / prev).ln(),
            }
        };
        result.push(r);
    }

    Ok(result)
}
