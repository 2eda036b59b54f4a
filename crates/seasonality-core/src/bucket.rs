//! Calendar bucketing strategies.
//!
//! A bucketing function maps a timestamp to a [`BucketKey`]. [`Bucketing`] bundles the
//! three calendar groupings with their display labels. Data and "now" are always
//! bucketed by the same function, see [`current_key`].

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::aggregate::{SeasonalityReport, aggregate};
use crate::error::{Result, SeasonalityError};
use crate::types::Observation;

/// Calendar bucket identifier produced by a bucketing function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BucketKey(pub u32);

impl BucketKey {
    /// Returns the raw key value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A known bucket key and its display label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BucketLabel {
    /// The bucket key.
    pub key: BucketKey,
    /// Human-readable name ("Monday", "March", "Week 2").
    pub label: &'static str,
}

impl BucketLabel {
    /// Creates a label.
    #[must_use]
    pub const fn new(key: u32, label: &'static str) -> Self {
        Self {
            key: BucketKey(key),
            label,
        }
    }
}

const WEEKDAY_LABELS: [BucketLabel; 7] = [
    BucketLabel::new(0, "Monday"),
    BucketLabel::new(1, "Tuesday"),
    BucketLabel::new(2, "Wednesday"),
    BucketLabel::new(3, "Thursday"),
    BucketLabel::new(4, "Friday"),
    BucketLabel::new(5, "Saturday"),
    BucketLabel::new(6, "Sunday"),
];

const MONTH_LABELS: [BucketLabel; 12] = [
    BucketLabel::new(1, "January"),
    BucketLabel::new(2, "February"),
    BucketLabel::new(3, "March"),
    BucketLabel::new(4, "April"),
    BucketLabel::new(5, "May"),
    BucketLabel::new(6, "June"),
    BucketLabel::new(7, "July"),
    BucketLabel::new(8, "August"),
    BucketLabel::new(9, "September"),
    BucketLabel::new(10, "October"),
    BucketLabel::new(11, "November"),
    BucketLabel::new(12, "December"),
];

// Days 29..=31 land in the fifth bucket.
const WEEK_OF_MONTH_LABELS: [BucketLabel; 5] = [
    BucketLabel::new(0, "Week 1"),
    BucketLabel::new(1, "Week 2"),
    BucketLabel::new(2, "Week 3"),
    BucketLabel::new(3, "Week 4"),
    BucketLabel::new(4, "Week 5"),
];

/// Weekday index, 0 = Monday .. 6 = Sunday.
#[must_use]
pub fn weekday_key(timestamp: DateTime<Utc>) -> BucketKey {
    BucketKey(timestamp.weekday().num_days_from_monday())
}

/// Calendar month, 1 = January .. 12 = December.
#[must_use]
pub fn month_key(timestamp: DateTime<Utc>) -> BucketKey {
    BucketKey(timestamp.month())
}

/// Week of month as `(day_of_month - 1) / 7`, 0 ..= 4.
#[must_use]
pub fn week_of_month_key(timestamp: DateTime<Utc>) -> BucketKey {
    BucketKey(timestamp.day0() / 7)
}

/// Returns the bucket "now" falls in under `bucket_fn`.
///
/// Exists so that the highlighted period in a chart is always computed with the
/// exact rule used to bucket the data.
pub fn current_key<F>(now: DateTime<Utc>, bucket_fn: F) -> BucketKey
where
    F: Fn(DateTime<Utc>) -> BucketKey,
{
    bucket_fn(now)
}

/// The calendar groupings seasonality can be computed over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucketing {
    /// Group by day of the week.
    Weekday,
    /// Group by calendar month.
    Month,
    /// Group by seven-day block within the month.
    WeekOfMonth,
}

impl Bucketing {
    /// All bucketing strategies.
    pub const ALL: [Self; 3] = [Self::Weekday, Self::Month, Self::WeekOfMonth];

    /// Maps a timestamp to its bucket.
    #[must_use]
    pub fn key(&self, timestamp: DateTime<Utc>) -> BucketKey {
        match self {
            Self::Weekday => weekday_key(timestamp),
            Self::Month => month_key(timestamp),
            Self::WeekOfMonth => week_of_month_key(timestamp),
        }
    }

    /// Known buckets in display order.
    #[must_use]
    pub const fn labels(&self) -> &'static [BucketLabel] {
        match self {
            Self::Weekday => &WEEKDAY_LABELS,
            Self::Month => &MONTH_LABELS,
            Self::WeekOfMonth => &WEEK_OF_MONTH_LABELS,
        }
    }

    /// Display label of `key`, if it is one of this strategy's buckets.
    #[must_use]
    pub fn label_of(&self, key: BucketKey) -> Option<&'static str> {
        self.labels()
            .iter()
            .find(|l| l.key == key)
            .map(|l| l.label)
    }

    /// Bucket containing `now`, computed with [`Self::key`].
    #[must_use]
    pub fn current_key(&self, now: DateTime<Utc>) -> BucketKey {
        current_key(now, |ts| self.key(ts))
    }

    /// Runs [`aggregate`] with this strategy's key function and labels.
    ///
    /// # Errors
    /// See [`aggregate`].
    pub fn aggregate(&self, observations: &[Observation]) -> Result<SeasonalityReport> {
        let report = aggregate(observations, |ts| self.key(ts), self.labels())?;
        Ok(report.named(self.name()))
    }

    /// Short machine name (`weekday`, `month`, `week-of-month`).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Weekday => "weekday",
            Self::Month => "month",
            Self::WeekOfMonth => "week-of-month",
        }
    }

    /// Grouping noun used in chart titles.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Weekday => "Weekday",
            Self::Month => "Month",
            Self::WeekOfMonth => "Week of Month",
        }
    }
}

impl fmt::Display for Bucketing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Bucketing {
    type Err = SeasonalityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekday" | "daily" => Ok(Self::Weekday),
            "month" | "monthly" => Ok(Self::Month),
            "week-of-month" | "week_of_month" | "weekly" => Ok(Self::WeekOfMonth),
            other => Err(SeasonalityError::Parse(format!("Invalid bucketing: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 23, 59, 59).unwrap()
    }

    #[test]
    fn test_weekday_key() {
        // 2024-01-01 was a Monday
        assert_eq!(weekday_key(at(2024, 1, 1)), BucketKey(0));
        assert_eq!(weekday_key(at(2024, 1, 2)), BucketKey(1));
        assert_eq!(weekday_key(at(2024, 1, 7)), BucketKey(6));
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(at(2023, 1, 31)), BucketKey(1));
        assert_eq!(month_key(at(2023, 12, 1)), BucketKey(12));
    }

    #[test]
    fn test_week_of_month_boundaries() {
        assert_eq!(week_of_month_key(at(2024, 3, 1)), BucketKey(0));
        assert_eq!(week_of_month_key(at(2024, 3, 7)), BucketKey(0));
        assert_eq!(week_of_month_key(at(2024, 3, 8)), BucketKey(1));
        assert_eq!(week_of_month_key(at(2024, 3, 28)), BucketKey(3));
        assert_eq!(week_of_month_key(at(2024, 3, 29)), BucketKey(4));
        assert_eq!(week_of_month_key(at(2024, 3, 31)), BucketKey(4));
    }

    #[test]
    fn test_every_key_has_a_label() {
        let mut day = at(2023, 1, 1);
        for _ in 0..800 {
            for bucketing in Bucketing::ALL {
                let key = bucketing.key(day);
                assert!(
                    bucketing.label_of(key).is_some(),
                    "{bucketing} produced unlabeled key {key} for {day}"
                );
            }
            day += chrono::Duration::days(1);
        }
    }

    #[test]
    fn test_current_key_uses_data_rule() {
        let now = at(2024, 2, 29);
        assert_eq!(Bucketing::WeekOfMonth.current_key(now), BucketKey(4));
        assert_eq!(Bucketing::Weekday.current_key(now), BucketKey(3));
        assert_eq!(Bucketing::Month.current_key(now), BucketKey(2));
        assert_eq!(current_key(now, month_key), BucketKey(2));
    }

    #[test]
    fn test_parse() {
        assert_eq!("Weekday".parse::<Bucketing>().unwrap(), Bucketing::Weekday);
        assert_eq!(
            "week-of-month".parse::<Bucketing>().unwrap(),
            Bucketing::WeekOfMonth
        );
        assert!("quarter".parse::<Bucketing>().is_err());
    }
}
