#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/seasonality/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Presentation of seasonality reports.
//!
//! - [`ChartRenderer`] - Standalone HTML cumulative-return chart with the current bucket highlighted
//! - [`summary_frame`] - Per-bucket statistics as a polars `DataFrame`
//! - [`summary_lines`] / [`detail_lines`] - Console output

/// HTML chart rendering.
pub mod html;
/// Statistics tables and console lines.
pub mod table;

pub use html::{ChartOptions, ChartRenderer, PLOTLY_CDN};
pub use table::{detail_lines, summary_frame, summary_lines, write_summary_csv};
