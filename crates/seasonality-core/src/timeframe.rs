//! Candle timeframe definitions.
//!
//! This module defines [`Timeframe`], the interval of the candles a table holds.
//! Timeframes use the exchange-style codes found in candle table names
//! (`BTCUSDT_1d`, `BTCUSDT_1M`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SeasonalityError;

/// Interval of the candles in a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    /// One-minute candles.
    Minute1,
    /// Three-minute candles.
    Minute3,
    /// Five-minute candles.
    Minute5,
    /// Fifteen-minute candles.
    Minute15,
    /// Thirty-minute candles.
    Minute30,
    /// Hourly candles.
    Hour1,
    /// Two-hour candles.
    Hour2,
    /// Four-hour candles.
    Hour4,
    /// Six-hour candles.
    Hour6,
    /// Eight-hour candles.
    Hour8,
    /// Twelve-hour candles.
    Hour12,
    /// Daily candles.
    Day1,
    /// Three-day candles.
    Day3,
    /// Weekly candles.
    Week1,
    /// Monthly candles.
    Month1,
}

impl Timeframe {
    /// Every supported timeframe, shortest first.
    pub const ALL: [Self; 15] = [
        Self::Minute1,
        Self::Minute3,
        Self::Minute5,
        Self::Minute15,
        Self::Minute30,
        Self::Hour1,
        Self::Hour2,
        Self::Hour4,
        Self::Hour6,
        Self::Hour8,
        Self::Hour12,
        Self::Day1,
        Self::Day3,
        Self::Week1,
        Self::Month1,
    ];

    /// Returns the table-name code for this timeframe (e.g. `"1d"`, `"1M"`).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute3 => "3m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour2 => "2h",
            Self::Hour4 => "4h",
            Self::Hour6 => "6h",
            Self::Hour8 => "8h",
            Self::Hour12 => "12h",
            Self::Day1 => "1d",
            Self::Day3 => "3d",
            Self::Week1 => "1w",
            Self::Month1 => "1M",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Timeframe {
    type Err = SeasonalityError;

    // Case matters: "1m" is one minute, "1M" is one month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|tf| tf.code() == s)
            .ok_or_else(|| SeasonalityError::Parse(format!("Invalid timeframe: {s}")))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = SeasonalityError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.code().to_string()
    }
}
