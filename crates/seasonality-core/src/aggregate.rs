//! Seasonality aggregation.
//!
//! [`aggregate`] partitions a chronological series of [`Observation`]s by a bucketing
//! function and computes, for every known bucket, return statistics and the running
//! cumulative return over that bucket's own occurrences.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::bucket::{BucketKey, BucketLabel};
use crate::error::{Result, SeasonalityError};
use crate::types::Observation;

/// One step of a bucket's cumulative-return trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    /// Timestamp of the contributing observation.
    pub timestamp: DateTime<Utc>,
    /// Return of the contributing observation.
    pub period_return: f64,
    /// Sum of the bucket's returns up to and including this observation.
    pub cumulative_return: f64,
}

/// Return statistics of a non-empty bucket.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReturnStatistics {
    /// Arithmetic mean of the bucket's returns.
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); `None` for a single member.
    pub std_dev: Option<f64>,
    /// Smallest return.
    pub min: f64,
    /// Largest return.
    pub max: f64,
    /// Sum of all returns, equal to the last trajectory value.
    pub total: f64,
}

impl ReturnStatistics {
    fn from_returns(returns: &[f64]) -> Option<Self> {
        if returns.is_empty() {
            return None;
        }
        let n = returns.len() as f64;
        let total: f64 = returns.iter().sum();
        let mean = total / n;
        let std_dev = (returns.len() > 1).then(|| {
            let ss: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        });
        let min = returns.iter().copied().fold(f64::INFINITY, f64::min);
        let max = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            mean,
            std_dev,
            min,
            max,
            total,
        })
    }
}

/// Statistics and trajectory for one bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BucketSummary {
    /// The bucket key.
    pub key: BucketKey,
    /// Display label of the bucket.
    pub label: String,
    /// Return statistics, `None` when no observation fell in this bucket.
    pub statistics: Option<ReturnStatistics>,
    /// Running sum of returns in chronological order of the bucket's members.
    pub trajectory: Vec<TrajectoryPoint>,
}

impl BucketSummary {
    /// Number of observations in the bucket.
    #[must_use]
    pub fn count(&self) -> usize {
        self.trajectory.len()
    }

    /// Returns true if no observation fell in this bucket.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    /// Mean return, if the bucket is populated.
    #[must_use]
    pub fn mean_return(&self) -> Option<f64> {
        self.statistics.map(|s| s.mean)
    }

    /// Iterator over the member returns in chronological order.
    pub fn returns(&self) -> impl Iterator<Item = f64> + '_ {
        self.trajectory.iter().map(|p| p.period_return)
    }
}

/// Per-bucket results of one aggregation, in label order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonalityReport {
    /// Name of the bucketing that produced the report, if known.
    pub bucketing: Option<String>,
    /// Number of observations aggregated.
    pub observation_count: usize,
    /// One summary per known bucket, in label order.
    pub buckets: Vec<BucketSummary>,
}

impl SeasonalityReport {
    pub(crate) fn named(mut self, name: &str) -> Self {
        self.bucketing = Some(name.to_string());
        self
    }

    /// Looks up the summary of a bucket.
    #[must_use]
    pub fn get(&self, key: BucketKey) -> Option<&BucketSummary> {
        self.buckets.iter().find(|b| b.key == key)
    }

    /// Iterator over the bucket summaries in label order.
    pub fn iter(&self) -> impl Iterator<Item = &BucketSummary> {
        self.buckets.iter()
    }

    /// Number of buckets, including empty ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if the report has no buckets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// First and last aggregated timestamps.
    #[must_use]
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let points = self.buckets.iter().flat_map(|b| b.trajectory.iter());
        let min = points.clone().map(|p| p.timestamp).min()?;
        let max = points.map(|p| p.timestamp).max()?;
        Some((min, max))
    }
}

/// Aggregates `observations` into the buckets enumerated by `bucket_labels`.
///
/// `observations` must be in chronological order (equal timestamps are kept as-is).
/// Every key in `bucket_labels` appears in the report; buckets nothing mapped to
/// carry `statistics: None` and an empty trajectory.
///
/// # Errors
/// Returns [`SeasonalityError::InvalidInput`] when:
/// - `observations` is empty;
/// - an observation has a zero or non-finite open, or a non-finite close;
/// - an observation's return overflows (an open too small relative to its close);
/// - a timestamp is earlier than the one before it;
/// - `bucket_fn` yields a key that is not in `bucket_labels`;
/// - `bucket_labels` lists the same key twice.
pub fn aggregate<F>(
    observations: &[Observation],
    bucket_fn: F,
    bucket_labels: &[BucketLabel],
) -> Result<SeasonalityReport>
where
    F: Fn(DateTime<Utc>) -> BucketKey,
{
    if observations.is_empty() {
        return Err(SeasonalityError::invalid_input("no observations to aggregate"));
    }

    let mut slots: HashMap<BucketKey, usize> = HashMap::with_capacity(bucket_labels.len());
    for (slot, label) in bucket_labels.iter().enumerate() {
        if slots.insert(label.key, slot).is_some() {
            return Err(SeasonalityError::invalid_input(format!(
                "bucket key {} is labeled more than once",
                label.key
            )));
        }
    }

    let mut members: Vec<Vec<(DateTime<Utc>, f64)>> = vec![Vec::new(); bucket_labels.len()];
    let mut previous: Option<DateTime<Utc>> = None;

    for (i, obs) in observations.iter().enumerate() {
        if !obs.open.is_finite() || !obs.close.is_finite() {
            return Err(SeasonalityError::invalid_input(format!(
                "observation {i} at {} has a non-finite price",
                obs.timestamp
            )));
        }
        if obs.open == 0.0 {
            return Err(SeasonalityError::invalid_input(format!(
                "observation {i} at {} has a zero open",
                obs.timestamp
            )));
        }
        if let Some(prev) = previous {
            if obs.timestamp < prev {
                return Err(SeasonalityError::invalid_input(format!(
                    "observation {i} at {} precedes {prev}; input must be chronological",
                    obs.timestamp
                )));
            }
        }
        previous = Some(obs.timestamp);

        let period_return = obs.period_return();
        if !period_return.is_finite() {
            return Err(SeasonalityError::invalid_input(format!(
                "observation {i} at {} has a non-finite return (open {}, close {})",
                obs.timestamp, obs.open, obs.close
            )));
        }

        let key = bucket_fn(obs.timestamp);
        let slot = *slots.get(&key).ok_or_else(|| {
            SeasonalityError::invalid_input(format!(
                "bucket key {key} for {} is not a known bucket",
                obs.timestamp
            ))
        })?;
        members[slot].push((obs.timestamp, period_return));
    }

    let buckets: Vec<BucketSummary> = bucket_labels
        .iter()
        .zip(members)
        .map(|(label, group)| {
            let returns: Vec<f64> = group.iter().map(|(_, r)| *r).collect();
            let mut running = 0.0;
            let trajectory = group
                .into_iter()
                .map(|(timestamp, period_return)| {
                    running += period_return;
                    TrajectoryPoint {
                        timestamp,
                        period_return,
                        cumulative_return: running,
                    }
                })
                .collect();
            BucketSummary {
                key: label.key,
                label: label.label.to_string(),
                statistics: ReturnStatistics::from_returns(&returns),
                trajectory,
            }
        })
        .collect();

    debug!(
        observations = observations.len(),
        buckets = buckets.len(),
        empty = buckets.iter().filter(|b| b.is_empty()).count(),
        "Aggregated seasonality"
    );

    Ok(SeasonalityReport {
        bucketing: None,
        observation_count: observations.len(),
        buckets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{Bucketing, weekday_key};
    use chrono::TimeZone;
    use proptest::prelude::*;

    const EPS: f64 = 1e-12;

    fn obs(y: i32, m: u32, d: u32, open: f64, close: f64) -> Observation {
        Observation::new(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(), open, close)
    }

    #[test]
    fn test_weekday_example() {
        // Mon 2024-01-01, Tue 2024-01-02, Mon 2024-01-08
        let data = vec![
            obs(2024, 1, 1, 100.0, 110.0),
            obs(2024, 1, 2, 200.0, 190.0),
            obs(2024, 1, 8, 110.0, 121.0),
        ];
        let report = Bucketing::Weekday.aggregate(&data).unwrap();
        assert_eq!(report.len(), 7);
        assert_eq!(report.bucketing.as_deref(), Some("weekday"));

        let monday = report.get(BucketKey(0)).unwrap();
        assert_eq!(monday.label, "Monday");
        let returns: Vec<f64> = monday.returns().collect();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < EPS);
        assert!((returns[1] - 0.10).abs() < EPS);
        assert!((monday.mean_return().unwrap() - 0.10).abs() < EPS);
        assert!((monday.trajectory[0].cumulative_return - 0.10).abs() < EPS);
        assert!((monday.trajectory[1].cumulative_return - 0.20).abs() < EPS);

        let tuesday = report.get(BucketKey(1)).unwrap();
        assert_eq!(tuesday.count(), 1);
        assert!((tuesday.mean_return().unwrap() + 0.05).abs() < EPS);
        assert!((tuesday.trajectory[0].cumulative_return + 0.05).abs() < EPS);
        assert_eq!(tuesday.statistics.unwrap().std_dev, None);

        let sunday = report.get(BucketKey(6)).unwrap();
        assert!(sunday.is_empty());
        assert!(sunday.statistics.is_none());
    }

    #[test]
    fn test_sample_standard_deviation() {
        // Mondays with returns 0.1, 0.2, 0.3
        let data = vec![
            obs(2024, 1, 1, 100.0, 110.0),
            obs(2024, 1, 8, 100.0, 120.0),
            obs(2024, 1, 15, 100.0, 130.0),
        ];
        let report = aggregate(&data, weekday_key, Bucketing::Weekday.labels()).unwrap();
        let stats = report.get(BucketKey(0)).unwrap().statistics.unwrap();
        assert!((stats.mean - 0.2).abs() < EPS);
        assert!((stats.std_dev.unwrap() - 0.1).abs() < 1e-9);
        assert!((stats.min - 0.1).abs() < EPS);
        assert!((stats.max - 0.3).abs() < EPS);
        assert!((stats.total - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = Bucketing::Month.aggregate(&[]).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_zero_open_rejected() {
        let data = vec![obs(2024, 1, 1, 100.0, 110.0), obs(2024, 1, 2, 0.0, 5.0)];
        let err = Bucketing::Weekday.aggregate(&data).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("zero open"));
    }

    #[test]
    fn test_nan_price_rejected() {
        let data = vec![obs(2024, 1, 1, 100.0, f64::NAN)];
        assert!(Bucketing::Weekday.aggregate(&data).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_overflowing_return_rejected() {
        let data = vec![obs(2024, 1, 1, 1e-320, 1e300), obs(2024, 1, 8, -1e-320, 1e300)];
        let err = Bucketing::Weekday.aggregate(&data).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("non-finite return"));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let data = vec![obs(2024, 1, 8, 100.0, 110.0), obs(2024, 1, 1, 100.0, 110.0)];
        let err = Bucketing::Weekday.aggregate(&data).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("chronological"));
    }

    #[test]
    fn test_equal_timestamps_kept() {
        let data = vec![obs(2024, 1, 1, 100.0, 110.0), obs(2024, 1, 1, 100.0, 90.0)];
        let report = Bucketing::Weekday.aggregate(&data).unwrap();
        let monday = report.get(BucketKey(0)).unwrap();
        assert_eq!(monday.count(), 2);
        assert!(monday.trajectory[1].cumulative_return.abs() < EPS);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let labels = [BucketLabel::new(0, "Week 1"), BucketLabel::new(1, "Week 2")];
        let data = vec![obs(2024, 1, 30, 100.0, 110.0)];
        let err = aggregate(&data, |ts| Bucketing::WeekOfMonth.key(ts), &labels).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let labels = [BucketLabel::new(0, "a"), BucketLabel::new(0, "b")];
        let data = vec![obs(2024, 1, 1, 100.0, 110.0)];
        assert!(aggregate(&data, weekday_key, &labels).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_custom_label_order_preserved() {
        let labels = [BucketLabel::new(6, "Sun"), BucketLabel::new(0, "Mon")];
        let data = vec![obs(2024, 1, 1, 100.0, 110.0), obs(2024, 1, 7, 100.0, 90.0)];
        let report = aggregate(&data, weekday_key, &labels).unwrap();
        let keys: Vec<u32> = report.iter().map(|b| b.key.value()).collect();
        assert_eq!(keys, vec![6, 0]);
        assert!(report.bucketing.is_none());
    }

    #[test]
    fn test_week_of_month_fifth_bucket() {
        let data = vec![obs(2024, 1, 29, 100.0, 101.0), obs(2024, 1, 31, 100.0, 103.0)];
        let report = Bucketing::WeekOfMonth.aggregate(&data).unwrap();
        let fifth = report.get(BucketKey(4)).unwrap();
        assert_eq!(fifth.label, "Week 5");
        assert_eq!(fifth.count(), 2);
    }

    #[test]
    fn test_time_range() {
        let data = vec![obs(2024, 1, 1, 1.0, 1.0), obs(2024, 3, 5, 1.0, 1.0)];
        let report = Bucketing::Month.aggregate(&data).unwrap();
        let (first, last) = report.time_range().unwrap();
        assert_eq!(first, data[0].timestamp);
        assert_eq!(last, data[1].timestamp);
    }

    #[test]
    fn test_current_key_unaffected_by_aggregation() {
        let now = Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap();
        let before = Bucketing::WeekOfMonth.current_key(now);
        let data = vec![obs(2024, 1, 1, 100.0, 110.0), obs(2024, 1, 20, 100.0, 95.0)];
        for _ in 0..5 {
            Bucketing::WeekOfMonth.aggregate(&data).unwrap();
        }
        assert_eq!(Bucketing::WeekOfMonth.current_key(now), before);
    }

    fn series() -> impl Strategy<Value = Vec<Observation>> {
        prop::collection::vec((0i64..6 * 3600, 1.0f64..1000.0, 1.0f64..1000.0), 1..120).prop_map(
            |steps| {
                let mut t = 1_577_836_800i64; // 2020-01-01
                steps
                    .into_iter()
                    .map(|(dt, open, close)| {
                        t += dt * 24;
                        Observation::new(
                            DateTime::from_timestamp(t, 0).unwrap_or_default(),
                            open,
                            close,
                        )
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_buckets_partition_input(data in series()) {
            for bucketing in Bucketing::ALL {
                let report = bucketing.aggregate(&data).unwrap();
                let mut seen: Vec<DateTime<Utc>> = report
                    .iter()
                    .flat_map(|b| b.trajectory.iter().map(|p| p.timestamp))
                    .collect();
                seen.sort();
                let mut expected: Vec<DateTime<Utc>> = data.iter().map(|o| o.timestamp).collect();
                expected.sort();
                prop_assert_eq!(seen, expected);
                for bucket in report.iter() {
                    for point in &bucket.trajectory {
                        prop_assert_eq!(bucketing.key(point.timestamp), bucket.key);
                    }
                }
            }
        }

        #[test]
        fn prop_trajectory_ends_at_total(data in series()) {
            for bucketing in Bucketing::ALL {
                let report = bucketing.aggregate(&data).unwrap();
                for bucket in report.iter().filter(|b| !b.is_empty()) {
                    let sum: f64 = bucket.returns().sum();
                    let last = bucket
                        .trajectory
                        .last()
                        .map(|p| p.cumulative_return)
                        .unwrap_or_default();
                    prop_assert!((last - sum).abs() < 1e-9);
                    let stats = bucket.statistics.unwrap();
                    prop_assert!((stats.mean - sum / bucket.count() as f64).abs() < 1e-9);
                    prop_assert!(stats.min <= stats.mean + 1e-12);
                    prop_assert!(stats.mean <= stats.max + 1e-12);
                }
            }
        }

        #[test]
        fn prop_trajectory_is_chronological(data in series()) {
            let report = Bucketing::Weekday.aggregate(&data).unwrap();
            for bucket in report.iter() {
                let ordered = bucket
                    .trajectory
                    .windows(2)
                    .all(|w| w[0].timestamp <= w[1].timestamp);
                prop_assert!(ordered);
            }
        }
    }
}
