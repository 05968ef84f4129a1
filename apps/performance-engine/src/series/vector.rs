//! Elementwise vector algebra and reductions.
//!
//! Binary operations over two series of different length silently
//! truncate to the shorter one. Callers that need strict alignment must
//! check lengths themselves.

/// Combine two series elementwise, truncating to the shorter.
pub fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}

/// Apply `f` to every element.
pub fn map(a: &[f64], f: impl Fn(f64) -> f64) -> Vec<f64> {
    a.iter().map(|&x| f(x)).collect()
}

/// `a + b`
pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    zip_with(a, b, |x, y| x + y)
}

/// `a - b`
pub fn subtract(a: &[f64], b: &[f64]) -> Vec<f64> {
    zip_with(a, b, |x, y| x - y)
}

/// `a * b`
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    zip_with(a, b, |x, y| x * y)
}

/// `a ^ exponent`
pub fn power(a: &[f64], exponent: f64) -> Vec<f64> {
    map(a, |x| x.powf(exponent))
}

/// `-a`
pub fn negate(a: &[f64]) -> Vec<f64> {
    map(a, |x| -x)
}

/// `a + scalar`
pub fn add_scalar(a: &[f64], scalar: f64) -> Vec<f64> {
    map(a, |x| x + scalar)
}

/// `a * scalar`
pub fn mul_scalar(a: &[f64], scalar: f64) -> Vec<f64> {
    map(a, |x| x * scalar)
}

/// Sum of all elements (0 for an empty series).
pub fn sum(a: &[f64]) -> f64 {
    a.iter().sum()
}

/// Product of all elements (1 for an empty series).
pub fn product(a: &[f64]) -> f64 {
    a.iter().product()
}

/// Arithmetic mean, `NaN` for an empty series.
pub fn average(a: &[f64]) -> f64 {
    if a.is_empty() {
        return f64::NAN;
    }
    sum(a) / a.len() as f64
}

/// Smallest element, `NaN` for an empty series.
pub fn min(a: &[f64]) -> f64 {
    a.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_ops_truncate_to_shorter() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0];

        assert_eq!(add(&a, &b), vec![11.0, 22.0]);
        assert_eq!(subtract(&b, &a), vec![9.0, 18.0]);
        assert_eq!(multiply(&a, &b), vec![10.0, 40.0]);
    }

    #[test]
    fn test_unary_ops() {
        let a = [1.0, -2.0, 3.0];

        assert_eq!(negate(&a), vec![-1.0, 2.0, -3.0]);
        assert_eq!(power(&a, 2.0), vec![1.0, 4.0, 9.0]);
        assert_eq!(add_scalar(&a, 1.0), vec![2.0, -1.0, 4.0]);
        assert_eq!(mul_scalar(&a, 2.0), vec![2.0, -4.0, 6.0]);
    }

    #[test]
    fn test_reductions() {
        let a = [1.0, 2.0, 3.0, 4.0];

        assert_eq!(sum(&a), 10.0);
        assert_eq!(product(&a), 24.0);
        assert_eq!(average(&a), 2.5);
        assert_eq!(min(&a), 1.0);
    }

    #[test]
    fn test_empty_reductions() {
        assert_eq!(sum(&[]), 0.0);
        assert_eq!(product(&[]), 1.0);
        assert!(average(&[]).is_nan());
        assert!(min(&[]).is_nan());
    }
}
