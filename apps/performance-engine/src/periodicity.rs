//! Sampling frequency inference and minute-to-daily resampling.
//!
//! The frequency of a series decides how many periods make up a year,
//! which in turn scales every annualization exponent and every per-period
//! MAR/Rf conversion. Inference classifies each gap between consecutive
//! timestamps and picks the bucket holding a strict plurality of gaps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MetricError;

/// Periods per year assumed when the frequency cannot be determined.
pub const DEFAULT_PERIOD: f64 = 252.0;

/// Sampling frequency of a value series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    /// 1 to 5 minutes between samples.
    Minute,
    /// 23 to 48 hours between samples.
    Day,
    /// 28 to 35 days between samples.
    Month,
    /// Roughly four months between samples.
    Quarter,
}

impl Frequency {
    /// Periods per year for this frequency.
    #[must_use]
    pub const fn periods_per_year(&self) -> f64 {
        match self {
            Self::Minute => 2520.0,
            Self::Day => 252.0,
            Self::Month => 12.0,
            Self::Quarter => 4.0,
        }
    }

    fn matches(&self, gap_hours: f64) -> bool {
        match self {
            Self::Minute => gap_hours >= 1.0 / 60.0 && gap_hours <= 5.0 / 60.0,
            Self::Day => gap_hours >= 23.0 && gap_hours < 48.0,
            Self::Month => gap_hours >= 28.0 * 24.0 && gap_hours <= 35.0 * 24.0,
            Self::Quarter => gap_hours >= 3.8 * 30.0 * 24.0 && gap_hours <= 4.2 * 30.0 * 24.0,
        }
    }

    const ALL: [Self; 4] = [Self::Minute, Self::Day, Self::Month, Self::Quarter];

    /// Classify timestamp spacing.
    ///
    /// Returns `None` for fewer than two timestamps, for ties, and when no
    /// bucket holds a strict plurality.
    #[must_use]
    pub fn infer(timestamps: &[DateTime<Utc>]) -> Option<Self> {
        if timestamps.len() < 2 {
            return None;
        }

        let mut counts = [0_usize; 4];
        for pair in timestamps.windows(2) {
            let gap = hours_between(pair[0], pair[1]);
            for (count, frequency) in counts.iter_mut().zip(Self::ALL) {
                if frequency.matches(gap) {
                    *count += 1;
                }
            }
        }

        let gaps = (timestamps.len() - 1) as f64;
        let ratios = counts.map(|c| c as f64 / gaps);
        debug!(
            minute = ratios[0],
            day = ratios[1],
            month = ratios[2],
            quarter = ratios[3],
            "Classified timestamp gaps"
        );

        Self::ALL
            .iter()
            .enumerate()
            .find(|&(i, _)| (0..4).all(|j| j == i || ratios[i] > ratios[j]))
            .map(|(_, &frequency)| frequency)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Minute => "minute",
            Self::Day => "day",
            Self::Month => "month",
            Self::Quarter => "quarter",
        };
        write!(f, "{name}")
    }
}

/// Periods per year implied by `timestamps`, defaulting to daily.
#[must_use]
pub fn infer_period(timestamps: &[DateTime<Utc>]) -> f64 {
    Frequency::infer(timestamps).map_or(DEFAULT_PERIOD, |f| f.periods_per_year())
}

/// Collapse intraday samples to one value per trading day.
///
/// A gap longer than `day_boundary_hours` between consecutive timestamps
/// marks a day boundary: the sample before it closes the day. The final
/// sample always closes the last day.
///
/// # Errors
///
/// Returns `InvalidInput` when the lengths differ or the series is empty.
pub fn resample_to_daily(
    timestamps: &[DateTime<Utc>],
    values: &[f64],
    day_boundary_hours: f64,
) -> Result<Vec<f64>, MetricError> {
    if timestamps.len() != values.len() {
        return Err(MetricError::invalid_input(format!(
            "timestamps ({}) and values ({}) differ in length",
            timestamps.len(),
            values.len()
        )));
    }
    let Some(&last) = values.last() else {
        return Err(MetricError::invalid_input("cannot resample an empty series"));
    };

    let mut closes: Vec<f64> = timestamps
        .windows(2)
        .zip(values)
        .filter(|(pair, _)| hours_between(pair[0], pair[1]) > day_boundary_hours)
        .map(|(_, &value)| value)
        .collect();
    closes.push(last);

    debug!(
        samples = values.len(),
        days = closes.len(),
        "Resampled minute series to daily closes"
    );
    Ok(closes)
}

fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn spaced(count: usize, step: Duration) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        (0..count).map(|i| start + step * i as i32).collect()
    }

    #[test]
    fn test_infer_daily() {
        let ts = spaced(10, Duration::days(1));
        assert_eq!(Frequency::infer(&ts), Some(Frequency::Day));
        assert!((infer_period(&ts) - 252.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_infer_minute() {
        let ts = spaced(30, Duration::minutes(1));
        assert_eq!(Frequency::infer(&ts), Some(Frequency::Minute));
        assert!((infer_period(&ts) - 2520.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_infer_monthly_and_quarterly() {
        assert_eq!(
            Frequency::infer(&spaced(12, Duration::days(30))),
            Some(Frequency::Month)
        );
        assert_eq!(
            Frequency::infer(&spaced(8, Duration::days(120))),
            Some(Frequency::Quarter)
        );
    }

    #[test]
    fn test_weekend_gaps_still_daily() {
        // Mon..Fri, weekend, Mon..Fri: one 72h gap among nine.
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 21, 0, 0).unwrap();
        let mut ts: Vec<_> = (0..5).map(|i| start + Duration::days(i)).collect();
        ts.extend((7..12).map(|i| start + Duration::days(i)));

        assert_eq!(Frequency::infer(&ts), Some(Frequency::Day));
    }

    #[test]
    fn test_short_or_ambiguous_defaults_daily() {
        assert_eq!(Frequency::infer(&[]), None);
        assert!((infer_period(&[]) - DEFAULT_PERIOD).abs() < f64::EPSILON);
        assert!((infer_period(&spaced(1, Duration::days(1))) - DEFAULT_PERIOD).abs() < f64::EPSILON);

        // Hourly gaps match no bucket.
        assert_eq!(Frequency::infer(&spaced(10, Duration::hours(1))), None);
    }

    #[test]
    fn test_tie_defaults_daily() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        let ts = vec![
            start,
            start + Duration::minutes(1),
            start + Duration::minutes(1) + Duration::days(30),
        ];
        assert_eq!(Frequency::infer(&ts), None);
    }

    #[test]
    fn test_resample_keeps_last_sample_of_each_day() {
        let day1 = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        let day2 = day1 + Duration::days(1);
        let ts = vec![
            day1,
            day1 + Duration::minutes(1),
            day1 + Duration::minutes(2),
            day2,
            day2 + Duration::minutes(1),
        ];
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];

        let daily = resample_to_daily(&ts, &values, 10.0).unwrap();
        assert_eq!(daily, vec![3.0, 5.0]);
    }

    #[test]
    fn test_resample_length_mismatch() {
        let ts = spaced(3, Duration::minutes(1));
        let result = resample_to_daily(&ts, &[1.0, 2.0], 10.0);
        assert!(matches!(result, Err(MetricError::InvalidInput(_))));
    }
}
