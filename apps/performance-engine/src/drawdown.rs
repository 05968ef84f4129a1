//! Drawdown series and episode segmentation.
//!
//! A drawdown series measures, for every period, how far the compounded
//! wealth sits below its running peak (`0` at a new peak, negative when
//! underwater). [`segment`] partitions that series into maximal runs of the
//! same sign, which is what the average-drawdown metrics summarize.

use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// One maximal run of same-signed drawdown state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownRun {
    /// First index of the run.
    pub begin: usize,
    /// One past the last index of the run.
    pub end: usize,
    /// Index of the deepest point.
    pub trough: usize,
    /// Most negative drawdown in the run (`0` for at-peak runs).
    pub depth: f64,
}

impl DrawdownRun {
    /// Number of samples covered by the run.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.end - self.begin
    }

    /// Episode length, counting the peak observation that anchors it.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.end - self.begin + 1
    }

    /// Periods from the trough to the end of the run.
    #[must_use]
    pub const fn recovery(&self) -> usize {
        self.end - self.trough
    }

    /// Whether the run is below peak.
    #[must_use]
    pub fn is_underwater(&self) -> bool {
        self.depth < 0.0
    }
}

/// Drawdown runs stored as parallel vectors indexed by run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownTable {
    /// Depth of each run.
    pub depth: Vec<f64>,
    /// Length of each run (see [`DrawdownRun::length`]).
    pub length: Vec<f64>,
    /// Recovery of each run.
    pub recovery: Vec<f64>,
}

impl DrawdownTable {
    /// Number of runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.depth.len()
    }

    /// Whether the table holds no run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    /// Aggregates over underwater runs: `(count, Σdepth, Σlength, Σrecovery)`.
    #[must_use]
    pub fn underwater_totals(&self) -> (usize, f64, f64, f64) {
        self.depth
            .iter()
            .zip(&self.length)
            .zip(&self.recovery)
            .filter(|((depth, _), _)| **depth < 0.0)
            .fold((0, 0.0, 0.0, 0.0), |(n, d, l, r), ((depth, length), recovery)| {
                (n + 1, d + depth, l + length, r + recovery)
            })
    }
}

impl FromIterator<DrawdownRun> for DrawdownTable {
    fn from_iter<I: IntoIterator<Item = DrawdownRun>>(iter: I) -> Self {
        let mut table = Self::default();
        for run in iter {
            table.depth.push(run.depth);
            table.length.push(run.length() as f64);
            table.recovery.push(run.recovery() as f64);
        }
        table
    }
}

/// Drawdown series of a return series by geometric compounding.
///
/// # Errors
///
/// Returns `EmptySeries` for an empty return series.
pub fn drawdowns(returns: &[f64]) -> Result<Vec<f64>, MetricError> {
    let Some(&first) = returns.first() else {
        return Err(MetricError::EmptySeries);
    };

    let mut wealth = 1.0;
    let mut peak = 1.0 + first;
    Ok(returns
        .iter()
        .map(|r| {
            wealth *= 1.0 + r;
            peak = f64::max(peak, wealth);
            wealth / peak - 1.0
        })
        .collect())
}

/// Partition a drawdown series into maximal same-sign runs.
///
/// Runs tile `[0, len)` in order. An empty input yields no runs.
#[must_use]
pub fn segment(drawdowns: &[f64]) -> Vec<DrawdownRun> {
    let Some(&first) = drawdowns.first() else {
        return Vec::new();
    };

    let mut runs = Vec::new();
    let mut current = DrawdownRun {
        begin: 0,
        end: 1,
        trough: 0,
        depth: first,
    };
    let mut underwater = first < 0.0;

    for (i, &dd) in drawdowns.iter().enumerate().skip(1) {
        if (dd < 0.0) == underwater {
            if dd < current.depth {
                current.depth = dd;
                current.trough = i;
            }
            current.end = i + 1;
        } else {
            runs.push(current);
            current = DrawdownRun {
                begin: i,
                end: i + 1,
                trough: i,
                depth: dd,
            };
            underwater = dd < 0.0;
        }
    }
    runs.push(current);

    runs
}

/// Squared depths of falling-value episodes, for the Burke ratio.
///
/// An episode opens when a value drops below its predecessor and closes on
/// the first value that does not fall (or at the end of the series). Its
/// depth is the last falling value relative to the value before the drop.
#[must_use]
pub fn burke_episodes(values: &[f64]) -> Vec<f64> {
    let mut depths = Vec::new();
    let mut peak: Option<usize> = None;

    for i in 1..values.len() {
        let falling = values[i] < values[i - 1];
        match (peak, falling) {
            (None, true) => peak = Some(i - 1),
            (Some(p), false) => {
                depths.push(values[i - 1] / values[p] - 1.0);
                peak = None;
            }
            _ => {}
        }
    }
    if let (Some(p), Some(&last)) = (peak, values.last()) {
        depths.push(last / values[p] - 1.0);
    }

    depths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawdowns_reference_series() {
        let returns = [0.0, 0.1, -0.1, 0.222_222_222_222_222_2];
        let dd = drawdowns(&returns).unwrap();

        assert_eq!(dd.len(), 4);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!((dd[2] + 0.1).abs() < 1e-12);
        assert!(dd[3].abs() < 1e-12);
    }

    #[test]
    fn test_drawdowns_empty() {
        assert!(matches!(drawdowns(&[]), Err(MetricError::EmptySeries)));
    }

    #[test]
    fn test_first_return_negative_is_its_own_peak() {
        let dd = drawdowns(&[-0.05, -0.05]).unwrap();
        assert_eq!(dd[0], 0.0);
        assert!((dd[1] + 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_segment_reference_series() {
        let runs = segment(&[0.0, 0.0, -0.1, 0.0]);

        assert_eq!(runs.len(), 3);
        assert_eq!((runs[0].begin, runs[0].end), (0, 2));
        assert_eq!((runs[1].begin, runs[1].end, runs[1].trough), (2, 3, 2));
        assert!((runs[1].depth + 0.1).abs() < f64::EPSILON);
        assert_eq!(runs[1].length(), 2);
        assert_eq!(runs[1].recovery(), 1);
        assert_eq!((runs[2].begin, runs[2].end), (3, 4));
    }

    #[test]
    fn test_segment_tracks_trough() {
        let runs = segment(&[0.0, -0.02, -0.08, -0.03, 0.0]);

        assert_eq!(runs.len(), 3);
        let underwater = runs[1];
        assert_eq!(underwater.trough, 2);
        assert_eq!(underwater.samples(), 3);
        assert_eq!(underwater.recovery(), 2);
        assert!((underwater.depth + 0.08).abs() < f64::EPSILON);
    }

    #[test]
    fn test_segment_single_element() {
        let runs = segment(&[0.0]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].samples(), 1);
    }

    #[test]
    fn test_segment_empty() {
        assert!(segment(&[]).is_empty());
    }

    #[test]
    fn test_table_underwater_totals() {
        let table: DrawdownTable = segment(&[0.0, -0.1, 0.0, -0.3, -0.2]).into_iter().collect();

        assert_eq!(table.len(), 4);
        let (count, depth, length, recovery) = table.underwater_totals();
        assert_eq!(count, 2);
        assert!((depth + 0.4).abs() < 1e-12);
        assert!((length - 5.0).abs() < f64::EPSILON); // 2 + 3
        assert!((recovery - 3.0).abs() < f64::EPSILON); // 1 + 2
    }

    #[test]
    fn test_burke_episodes() {
        let values = [100.0, 90.0, 80.0, 85.0, 84.0];
        let depths = burke_episodes(&values);

        assert_eq!(depths.len(), 2);
        assert!((depths[0] + 0.2).abs() < 1e-12);
        assert!((depths[1] - (84.0 / 85.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_burke_episodes_monotone() {
        assert!(burke_episodes(&[1.0, 2.0, 3.0]).is_empty());
    }
}
