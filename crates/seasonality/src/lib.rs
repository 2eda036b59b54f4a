#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/seasonality/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Calendar seasonality analysis for OHLC candle series.
//!
//! This crate ties the workspace together. It re-exports the core types, the
//! candle stores and the renderers, and provides a [`SeasonalityRunner`] that loads
//! one configured series, aggregates it by weekday, month or week of month, and
//! writes a cumulative-return chart per grouping with the current period highlighted.
//!
//! # Features
//!
//! - `sqlite` - SQLite candle store and `SeasonalityRunner::open_sqlite`
//!
//! # Example
//!
//! ```rust,ignore
//! use seasonality::{Bucketing, SeasonalityConfig, SeasonalityRunner, Symbol, Timeframe};
//!
//! fn main() -> seasonality::Result<()> {
//!     let config = SeasonalityConfig::new(Symbol::new("BTCUSDT"), Timeframe::Day1, "candles.db");
//!     let runner = SeasonalityRunner::open_sqlite(config)?;
//!
//!     for output in runner.run_all()? {
//!         for line in seasonality::summary_lines(&output.analysis.report) {
//!             println!("{line}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use seasonality_core::*;

// Stores
pub use seasonality_store::InMemoryCandleStore;
#[cfg(feature = "sqlite")]
pub use seasonality_store::SqliteCandleStore;

// Presentation
pub use seasonality_chart::{
    ChartOptions, ChartRenderer, detail_lines, summary_frame, summary_lines, write_summary_csv,
};

mod config;
mod runner;
pub use config::SeasonalityConfig;
pub use runner::{Analysis, RunOutput, SeasonalityRunner, chart_file_name, stats_file_name};
