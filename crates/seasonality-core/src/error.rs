//! Error types for seasonality operations.
//!
//! This module defines [`SeasonalityError`] which covers all error cases that can occur
//! when loading candles, aggregating returns, or rendering reports.

use thiserror::Error;

/// Errors that can occur during seasonality operations.
#[derive(Error, Debug)]
pub enum SeasonalityError {
    /// The inputs handed to the aggregator are unusable (empty series, zero open,
    /// out-of-order timestamps, unknown bucket keys).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No candle data exists for the requested symbol and timeframe.
    #[error("Data not available for {symbol} at timeframe {timeframe}")]
    DataNotAvailable {
        /// The symbol that was requested.
        symbol: String,
        /// The timeframe that was requested.
        timeframe: String,
    },

    /// Error talking to the candle storage.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error parsing stored or user-provided data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error producing a chart or statistics table.
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SeasonalityError {
    /// Shorthand for [`SeasonalityError::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns true if this error was caused by the caller's inputs.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias using [`SeasonalityError`].
pub type Result<T> = std::result::Result<T, SeasonalityError>;
