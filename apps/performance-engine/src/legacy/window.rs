//! Fixed-capacity window of the most recent samples.

use std::collections::VecDeque;

use crate::error::MetricError;

/// Bounded window keeping the most recent `capacity` samples.
///
/// Pushing into a full window drops the oldest sample. `NaN` inputs are
/// stored as `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow {
    buf: VecDeque<f64>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create an empty window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, MetricError> {
        if capacity == 0 {
            return Err(MetricError::invalid_input(
                "window capacity must be positive",
            ));
        }
        Ok(Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Create a window sized to hold exactly `values`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `values` is empty.
    pub fn from_slice(values: &[f64]) -> Result<Self, MetricError> {
        let mut window = Self::new(values.len())?;
        for &v in values {
            window.push(v);
        }
        Ok(window)
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, value: f64) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(if value.is_nan() { 0.0 } else { value });
    }

    /// Retained samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.buf.iter().copied()
    }

    /// Retained samples as a vector, oldest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Maximum number of retained samples.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest retained sample.
    pub fn first(&self) -> Option<f64> {
        self.buf.front().copied()
    }

    /// Sum of retained samples.
    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Mean of retained samples, `NaN` when empty.
    pub fn average(&self) -> f64 {
        if self.buf.is_empty() {
            f64::NAN
        } else {
            self.sum() / self.buf.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            SlidingWindow::new(0),
            Err(MetricError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_partial_window_in_order() {
        let mut window = SlidingWindow::new(5).unwrap();
        for i in 0..3 {
            window.push(f64::from(i));
        }

        assert_eq!(window.to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(window.len(), 3);
        assert_eq!(window.capacity(), 5);
        assert_eq!(window.first(), Some(0.0));
        assert!((window.average() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wraparound_evicts_oldest() {
        let mut window = SlidingWindow::new(3).unwrap();
        for i in 0..7 {
            window.push(f64::from(i));
        }

        assert_eq!(window.to_vec(), vec![4.0, 5.0, 6.0]);
        assert_eq!(window.first(), Some(4.0));
        assert!((window.sum() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_window_keeps_capacity() {
        let mut window = SlidingWindow::from_slice(&[1.0, 2.0]).unwrap();
        window.push(3.0);
        window.push(f64::NAN);

        assert_eq!(window.len(), 2);
        assert_eq!(window.capacity(), 2);
        assert_eq!(window.to_vec(), vec![3.0, 0.0]);
    }

    #[test]
    fn test_nan_stored_as_zero() {
        let window = SlidingWindow::from_slice(&[1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(window.to_vec(), vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_empty_average_is_nan() {
        let window = SlidingWindow::new(2).unwrap();
        assert!(window.is_empty());
        assert!(window.average().is_nan());
        assert_eq!(window.first(), None);
    }
}
