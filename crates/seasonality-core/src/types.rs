//! Core data types for seasonality analysis.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Observation`] - One candle reduced to the fields the aggregator needs
//! - [`LoadWindow`] - Selection of the most recent candles to load
//! - [`CandleRequest`] - What a [`CandleSource`](crate::source::CandleSource) should load

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SeasonalityError};
use crate::timeframe::Timeframe;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation, including when deserialized.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks that the symbol is non-empty and ASCII alphanumeric.
    ///
    /// Candle tables are named after the symbol, so anything else is refused
    /// before it reaches a query.
    ///
    /// # Errors
    /// Returns [`SeasonalityError::InvalidInput`] for empty or non-alphanumeric symbols.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(SeasonalityError::invalid_input("symbol is empty"));
        }
        if !self.0.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SeasonalityError::invalid_input(format!(
                "symbol {:?} must be ASCII alphanumeric",
                self.0
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = SeasonalityError;

    fn from_str(s: &str) -> Result<Self> {
        let symbol = Self::new(s);
        symbol.validate()?;
        Ok(symbol)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One candle reduced to the fields the aggregator needs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Timestamp the candle is bucketed by (its close time).
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Closing price.
    pub close: f64,
}

impl Observation {
    /// Creates a new observation.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, open: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            close,
        }
    }

    /// Creates an observation from an epoch-millisecond timestamp.
    ///
    /// # Errors
    /// Returns [`SeasonalityError::Parse`] if the timestamp is outside chrono's range.
    pub fn from_millis(millis: i64, open: f64, close: f64) -> Result<Self> {
        let timestamp = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            SeasonalityError::Parse(format!("timestamp {millis}ms is out of range"))
        })?;
        Ok(Self::new(timestamp, open, close))
    }

    /// Returns `(close - open) / open`.
    ///
    /// Not finite when `open` is zero; [`aggregate`](crate::aggregate::aggregate)
    /// rejects such observations before calling this.
    #[must_use]
    pub fn period_return(&self) -> f64 {
        (self.close - self.open) / self.open
    }
}

/// Selection of the most recent candles to load.
///
/// Mirrors `ORDER BY close_time DESC LIMIT .. OFFSET ..`: `limit` counts candles
/// back from the newest one after skipping `offset` of them. `None` means no limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadWindow {
    /// Maximum number of candles to load.
    pub limit: Option<usize>,
    /// Number of newest candles to skip.
    pub offset: usize,
}

impl LoadWindow {
    /// A window covering the whole series.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            limit: None,
            offset: 0,
        }
    }

    /// A window over the `limit` newest candles.
    #[must_use]
    pub const fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: 0,
        }
    }

    /// Sets the number of newest candles to skip.
    #[must_use]
    pub const fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Builds a window from the configuration convention where a zero limit means "all".
    #[must_use]
    pub const fn from_config(limit: usize, offset: usize) -> Self {
        Self {
            limit: if limit == 0 { None } else { Some(limit) },
            offset,
        }
    }
}

/// A request for the candles of one symbol at one timeframe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandleRequest {
    /// Symbol to load.
    pub symbol: Symbol,
    /// Candle interval.
    pub timeframe: Timeframe,
    /// Which part of the series to load.
    pub window: LoadWindow,
}

impl CandleRequest {
    /// Creates a request for the whole series.
    #[must_use]
    pub const fn new(symbol: Symbol, timeframe: Timeframe) -> Self {
        Self {
            symbol,
            timeframe,
            window: LoadWindow::all(),
        }
    }

    /// Restricts the request to a window of the most recent candles.
    #[must_use]
    pub fn with_window(mut self, window: LoadWindow) -> Self {
        self.window = window;
        self
    }
}
