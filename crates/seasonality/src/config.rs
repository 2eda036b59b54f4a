//! Run configuration.
//!
//! [`SeasonalityConfig`] names the series to analyze and where results go. It is read
//! from TOML and can be overridden field by field (the CLI does so from flags).
//!
//! ```toml
//! symbol = "BTCUSDT"
//! timeframe = "1d"
//! storage_location = "data/candles.db"
//! limit = 0        # 0 = every candle
//! offset = 0
//! output_dir = "reports"
//! stats_csv = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use seasonality_core::{CandleRequest, LoadWindow, Result, SeasonalityError, Symbol, Timeframe};

/// Configuration of one seasonality run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeasonalityConfig {
    /// Asset symbol; also the prefix of the candle table name.
    pub symbol: Symbol,
    /// Candle interval; the suffix of the candle table name.
    pub timeframe: Timeframe,
    /// Path of the SQLite candle database.
    pub storage_location: PathBuf,
    /// Number of most recent candles to load, 0 for all.
    #[serde(default)]
    pub limit: usize,
    /// Number of most recent candles to skip.
    #[serde(default)]
    pub offset: usize,
    /// Directory charts and statistics are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Also write per-bucket statistics as CSV.
    #[serde(default)]
    pub stats_csv: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self::new(Symbol::new("BTCUSDT"), Timeframe::Day1, "candles.db")
    }
}

impl SeasonalityConfig {
    /// Creates a configuration loading every candle and writing to the working directory.
    #[must_use]
    pub fn new(symbol: Symbol, timeframe: Timeframe, storage_location: impl Into<PathBuf>) -> Self {
        Self {
            symbol,
            timeframe,
            storage_location: storage_location.into(),
            limit: 0,
            offset: 0,
            output_dir: default_output_dir(),
            stats_csv: false,
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns [`SeasonalityError::Config`] on syntax errors, unknown keys or invalid values.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SeasonalityError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    /// Returns [`SeasonalityError::Config`] if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| SeasonalityError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// Checks the symbol is table-safe and the storage location is set.
    ///
    /// # Errors
    /// Returns [`SeasonalityError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.symbol
            .validate()
            .map_err(|e| SeasonalityError::Config(format!("symbol: {e}")))?;
        if self.storage_location.as_os_str().is_empty() {
            return Err(SeasonalityError::Config(
                "storage_location must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The candle window selected by `limit` and `offset`.
    #[must_use]
    pub const fn window(&self) -> LoadWindow {
        LoadWindow::from_config(self.limit, self.offset)
    }

    /// The candle request this configuration describes.
    #[must_use]
    pub fn request(&self) -> CandleRequest {
        CandleRequest::new(self.symbol.clone(), self.timeframe).with_window(self.window())
    }
}
