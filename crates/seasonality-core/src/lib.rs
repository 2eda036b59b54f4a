#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/seasonality/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and the seasonality aggregator.
//!
//! This crate provides the foundational pieces of seasonality analysis:
//!
//! - [`aggregate`](aggregate::aggregate) - Per-bucket return statistics and cumulative trajectories
//! - [`Bucketing`](bucket::Bucketing) - Weekday, month and week-of-month groupings
//! - [`current_key`](bucket::current_key) - The bucket "now" falls in
//! - [`CandleSource`](source::CandleSource) - Loading abstraction implemented by stores
//! - [`SeasonalityError`](error::SeasonalityError) - Error taxonomy

/// Seasonality aggregation.
pub mod aggregate;
/// Calendar bucketing strategies.
pub mod bucket;
/// Error types for seasonality operations.
pub mod error;
/// Candle source trait.
pub mod source;
/// Candle timeframe definitions.
pub mod timeframe;
/// Core data types (Symbol, Observation, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use aggregate::{
    BucketSummary, ReturnStatistics, SeasonalityReport, TrajectoryPoint, aggregate,
};
pub use bucket::{
    BucketKey, BucketLabel, Bucketing, current_key, month_key, week_of_month_key, weekday_key,
};
pub use error::{Result, SeasonalityError};
pub use source::CandleSource;
pub use timeframe::Timeframe;
pub use types::{CandleRequest, LoadWindow, Observation, Symbol};
