#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/seasonality/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Candle loaders for seasonality analysis.
//!
//! This crate provides implementations of the [`CandleSource`] trait from `seasonality-core`:
//!
//! - `SqliteCandleStore` - Read-only loader over `{SYMBOL}_{timeframe}` tables (default, requires `sqlite` feature)
//! - [`InMemoryCandleStore`] - Series held in memory, for testing and embedding

/// In-memory store implementation.
pub mod memory;

/// SQLite loader implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use seasonality_core::CandleSource;

pub use memory::{InMemoryCandleStore, apply_window};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteCandleStore, observations_from_frame};
