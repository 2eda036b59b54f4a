//! Load → aggregate → render pipeline.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use seasonality_chart::{ChartOptions, ChartRenderer, write_summary_csv};
use seasonality_core::{
    BucketKey, Bucketing, CandleSource, Observation, Result, SeasonalityReport,
};

use crate::config::SeasonalityConfig;

/// File name of the chart written for `bucketing`.
#[must_use]
pub const fn chart_file_name(bucketing: Bucketing) -> &'static str {
    match bucketing {
        Bucketing::Weekday => "cumulative_daily_returns.html",
        Bucketing::Month => "cumulative_monthly_returns.html",
        Bucketing::WeekOfMonth => "cumulative_daily_returns_by_week_of_month.html",
    }
}

/// File name of the statistics CSV written for `bucketing`.
#[must_use]
pub fn stats_file_name(bucketing: Bucketing) -> String {
    format!("seasonality_{}_stats.csv", bucketing.name().replace('-', "_"))
}

/// An aggregated report with the bucket "now" falls in.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Grouping the report was computed with.
    pub bucketing: Bucketing,
    /// Per-bucket statistics and trajectories.
    pub report: SeasonalityReport,
    /// Bucket of the runner's clock, computed with the same rule as the data.
    pub current: BucketKey,
}

/// Result of one [`SeasonalityRunner::run`].
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The analysis that was rendered.
    pub analysis: Analysis,
    /// Path of the written chart.
    pub chart_path: PathBuf,
    /// Path of the written statistics CSV, if enabled.
    pub stats_path: Option<PathBuf>,
}

/// Runs seasonality analyses for one configured series.
///
/// # Example
///
/// ```rust,ignore
/// use seasonality::{Bucketing, SeasonalityConfig, SeasonalityRunner};
///
/// let config = SeasonalityConfig::from_path("seasonality.toml")?;
/// let runner = SeasonalityRunner::open_sqlite(config)?;
/// let output = runner.run(Bucketing::Weekday)?;
/// println!("chart written to {}", output.chart_path.display());
/// ```
#[derive(Debug)]
pub struct SeasonalityRunner<S> {
    source: S,
    config: SeasonalityConfig,
    now: DateTime<Utc>,
}

impl<S: CandleSource> SeasonalityRunner<S> {
    /// Create a runner reading from `source`, with the clock set to the current time.
    #[must_use]
    pub fn new(source: S, config: SeasonalityConfig) -> Self {
        Self {
            source,
            config,
            now: Utc::now(),
        }
    }

    /// Fix the instant used to pick the highlighted bucket.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Returns the runner's configuration.
    #[must_use]
    pub const fn config(&self) -> &SeasonalityConfig {
        &self.config
    }

    /// Load the configured series.
    ///
    /// # Errors
    /// Propagates source errors.
    #[instrument(skip(self), fields(source = self.source.name(), symbol = %self.config.symbol))]
    pub fn load(&self) -> Result<Vec<Observation>> {
        let observations = self.source.load_observations(&self.config.request())?;
        info!(rows = observations.len(), "Loaded candles");
        Ok(observations)
    }

    /// Aggregate `observations` and select the current bucket.
    ///
    /// # Errors
    /// Returns [`SeasonalityError::InvalidInput`](seasonality_core::SeasonalityError::InvalidInput)
    /// for unusable observations.
    pub fn analyze(&self, observations: &[Observation], bucketing: Bucketing) -> Result<Analysis> {
        let report = bucketing.aggregate(observations)?;
        let current = bucketing.current_key(self.now);
        if report.get(current).is_none_or(|b| b.is_empty()) {
            warn!(bucketing = %bucketing, current = %current, "Current bucket has no candles");
        }
        debug!(bucketing = %bucketing, current = %current, "Analyzed seasonality");
        Ok(Analysis {
            bucketing,
            report,
            current,
        })
    }

    /// Write the chart (and statistics CSV, if enabled) of an analysis.
    ///
    /// # Errors
    /// Returns an error if the output directory or files cannot be written.
    pub fn render(&self, analysis: Analysis) -> Result<RunOutput> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let renderer = ChartRenderer::new(ChartOptions::for_bucketing(
            self.config.symbol.as_str(),
            analysis.bucketing,
        ));
        let chart_path = self
            .config
            .output_dir
            .join(chart_file_name(analysis.bucketing));
        renderer.write(&chart_path, &analysis.report, analysis.current)?;

        let stats_path = if self.config.stats_csv {
            let path = self.config.output_dir.join(stats_file_name(analysis.bucketing));
            write_summary_csv(&path, &analysis.report)?;
            Some(path)
        } else {
            None
        };

        info!(
            bucketing = %analysis.bucketing,
            chart = %chart_path.display(),
            "Wrote seasonality chart"
        );
        Ok(RunOutput {
            analysis,
            chart_path,
            stats_path,
        })
    }

    /// Load, aggregate and render one bucketing.
    ///
    /// # Errors
    /// Propagates load, aggregation and rendering errors.
    pub fn run(&self, bucketing: Bucketing) -> Result<RunOutput> {
        let observations = self.load()?;
        self.render(self.analyze(&observations, bucketing)?)
    }

    /// Load once and render every bucketing.
    ///
    /// # Errors
    /// Stops at the first failing bucketing.
    pub fn run_all(&self) -> Result<Vec<RunOutput>> {
        let observations = self.load()?;
        Bucketing::ALL
            .into_iter()
            .map(|bucketing| self.render(self.analyze(&observations, bucketing)?))
            .collect()
    }
}

#[cfg(feature = "sqlite")]
impl SeasonalityRunner<seasonality_store::SqliteCandleStore> {
    /// Create a runner over the SQLite database named by `config.storage_location`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the database cannot be opened.
    pub fn open_sqlite(config: SeasonalityConfig) -> Result<Self> {
        config.validate()?;
        let store = seasonality_store::SqliteCandleStore::open(&config.storage_location)?;
        Ok(Self::new(store, config))
    }
}
