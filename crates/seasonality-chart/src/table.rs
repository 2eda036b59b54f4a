//! Tabular and console views of a [`SeasonalityReport`].

use polars::prelude::*;
use seasonality_core::{Result, SeasonalityError, SeasonalityReport};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Build a statistics table with one row per bucket.
///
/// Columns: `bucket`, `count`, `mean`, `std`, `min`, `max`, `total`. Statistics of
/// empty buckets are null.
///
/// # Errors
/// Returns [`SeasonalityError::Render`] if the frame cannot be built.
pub fn summary_frame(report: &SeasonalityReport) -> Result<DataFrame> {
    let mut labels = Vec::with_capacity(report.len());
    let mut counts = Vec::with_capacity(report.len());
    let mut means: Vec<Option<f64>> = Vec::with_capacity(report.len());
    let mut stds: Vec<Option<f64>> = Vec::with_capacity(report.len());
    let mut mins: Vec<Option<f64>> = Vec::with_capacity(report.len());
    let mut maxs: Vec<Option<f64>> = Vec::with_capacity(report.len());
    let mut totals: Vec<Option<f64>> = Vec::with_capacity(report.len());

    for bucket in report.iter() {
        labels.push(bucket.label.clone());
        counts.push(u32::try_from(bucket.count()).unwrap_or(u32::MAX));
        let stats = bucket.statistics;
        means.push(stats.map(|s| s.mean));
        stds.push(stats.and_then(|s| s.std_dev));
        mins.push(stats.map(|s| s.min));
        maxs.push(stats.map(|s| s.max));
        totals.push(stats.map(|s| s.total));
    }

    DataFrame::new(vec![
        Column::new("bucket".into(), labels),
        Column::new("count".into(), counts),
        Column::new("mean".into(), means),
        Column::new("std".into(), stds),
        Column::new("min".into(), mins),
        Column::new("max".into(), maxs),
        Column::new("total".into(), totals),
    ])
    .map_err(|e| SeasonalityError::Render(e.to_string()))
}

/// Write [`summary_frame`] as CSV to `path`.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_summary_csv(path: impl AsRef<Path>, report: &SeasonalityReport) -> Result<()> {
    let mut df = summary_frame(report)?;
    let mut file = File::create(path.as_ref())?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| SeasonalityError::Render(e.to_string()))?;
    debug!(path = %path.as_ref().display(), rows = df.height(), "Wrote summary CSV");
    Ok(())
}

/// One `"<label>: <mean>"` line per bucket, mean to four decimals; `n/a` for empty buckets.
#[must_use]
pub fn summary_lines(report: &SeasonalityReport) -> Vec<String> {
    report
        .iter()
        .map(|bucket| match bucket.mean_return() {
            Some(mean) => format!("{}: {mean:.4}", bucket.label),
            None => format!("{}: n/a", bucket.label),
        })
        .collect()
}

/// One line per bucket with every statistic.
#[must_use]
pub fn detail_lines(report: &SeasonalityReport) -> Vec<String> {
    report
        .iter()
        .map(|bucket| match bucket.statistics {
            Some(s) => format!(
                "{:<10} n={:<5} mean={:>8.4} std={} min={:>8.4} max={:>8.4} cum={:>8.4}",
                bucket.label,
                bucket.count(),
                s.mean,
                s.std_dev
                    .map_or_else(|| format!("{:>8}", "n/a"), |v| format!("{v:>8.4}")),
                s.min,
                s.max,
                s.total,
            ),
            None => format!("{:<10} n=0     (no data)", bucket.label),
        })
        .collect()
}
