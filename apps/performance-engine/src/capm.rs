//! Ordinary least squares for CAPM alpha and beta.

use serde::{Deserialize, Serialize};

/// Relative size of `n·Σ(x−x̄)²` against `n·Σx²` below which `x` is constant.
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

/// Intercept and slope of `y = alpha + beta·x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    /// Intercept.
    pub alpha: f64,
    /// Slope.
    pub beta: f64,
}

/// Regress `y` on `x` by OLS.
///
/// Mismatched lengths truncate to the shorter series. A constant `x` (or
/// empty input) yields `NaN` coefficients rather than an error; metrics that
/// divide by beta report the degenerate case themselves.
#[must_use]
pub fn regress(x: &[f64], y: &[f64]) -> Regression {
    let (n, sum_x, sum_y, sum_xy, sum_xx) = x.iter().zip(y).fold(
        (0.0_f64, 0.0, 0.0, 0.0, 0.0),
        |(n, sx, sy, sxy, sxx), (&xi, &yi)| {
            (n + 1.0, sx + xi, sy + yi, xi.mul_add(yi, sxy), xi.mul_add(xi, sxx))
        },
    );

    let ss_xy = n.mul_add(sum_xy, -(sum_x * sum_y));
    let ss_xx = n.mul_add(sum_xx, -(sum_x * sum_x));
    // Rounding noise of a constant x counts as zero variance.
    let beta = if ss_xx <= n * sum_xx * ZERO_VARIANCE_TOLERANCE {
        f64::NAN
    } else {
        ss_xy / ss_xx
    };
    let alpha = beta.mul_add(-sum_x, sum_y) / n;

    Regression { alpha, beta }
}

/// Residuals `y − beta·x − alpha`, truncated to the shorter series.
#[must_use]
pub fn residuals(x: &[f64], y: &[f64], fit: Regression) -> Vec<f64> {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| yi - fit.beta.mul_add(xi, fit.alpha))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_line() {
        let x = [0.01, -0.02, 0.03, 0.005];
        let y: Vec<f64> = x.iter().map(|v| 0.001 + 1.5 * v).collect();

        let fit = regress(&x, &y);
        assert!((fit.beta - 1.5).abs() < 1e-9);
        assert!((fit.alpha - 0.001).abs() < 1e-9);

        let eps = residuals(&x, &y, fit);
        assert!(eps.iter().all(|e| e.abs() < 1e-9));
    }

    #[test]
    fn test_zero_variance_is_nan() {
        let fit = regress(&[0.01, 0.01, 0.01], &[0.02, -0.01, 0.03]);
        assert!(fit.beta.is_nan());
        assert!(fit.alpha.is_nan());
    }

    #[test]
    fn test_truncates_to_shorter() {
        let fit = regress(&[1.0, 2.0, 3.0, 100.0], &[2.0, 4.0, 6.0]);
        assert!((fit.beta - 2.0).abs() < 1e-12);
        assert!(fit.alpha.abs() < 1e-12);
    }

    #[test]
    fn test_empty_is_nan() {
        let fit = regress(&[], &[]);
        assert!(fit.beta.is_nan());
    }
}
