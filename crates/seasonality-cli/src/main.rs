//! `seasonality` command-line entry point.
//!
//! Loads candles from a SQLite database, groups their returns by weekday, month
//! or week of month, writes the cumulative-return chart and prints the mean
//! return of every bucket.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use seasonality::{
    Bucketing, Result, RunOutput, SeasonalityConfig, SeasonalityRunner, Symbol, Timeframe,
    detail_lines, summary_lines,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "seasonality",
    version,
    about = "Cumulative return seasonality charts from SQLite candles"
)]
struct Cli {
    /// Grouping to analyze
    #[arg(value_enum, default_value_t = Target::All)]
    target: Target,

    /// TOML configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the SQLite candle database
    #[arg(long)]
    db: Option<PathBuf>,

    /// Asset symbol, e.g. BTCUSDT
    #[arg(long, value_parser = Symbol::from_str)]
    symbol: Option<Symbol>,

    /// Candle interval (1m, 5m, 1h, 4h, 1d, 1w, 1M, ...)
    #[arg(long)]
    timeframe: Option<Timeframe>,

    /// Number of most recent candles to load, 0 for all
    #[arg(long)]
    limit: Option<usize>,

    /// Number of most recent candles to skip
    #[arg(long)]
    offset: Option<usize>,

    /// Directory the charts are written to
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Also write per-bucket statistics as CSV
    #[arg(long, default_value_t = false)]
    stats_csv: bool,

    /// Instant that selects the highlighted bucket (RFC 3339), defaults to now
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Print every statistic instead of the mean only
    #[arg(long, default_value_t = false)]
    detailed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Target {
    Weekday,
    Month,
    WeekOfMonth,
    All,
}

impl Target {
    const fn bucketing(self) -> Option<Bucketing> {
        match self {
            Self::Weekday => Some(Bucketing::Weekday),
            Self::Month => Some(Bucketing::Month),
            Self::WeekOfMonth => Some(Bucketing::WeekOfMonth),
            Self::All => None,
        }
    }
}

impl Cli {
    fn config(&self) -> Result<SeasonalityConfig> {
        let mut config = match &self.config {
            Some(path) => SeasonalityConfig::from_path(path)?,
            None => SeasonalityConfig::default(),
        };
        if let Some(db) = &self.db {
            config.storage_location.clone_from(db);
        }
        if let Some(symbol) = &self.symbol {
            config.symbol = symbol.clone();
        }
        if let Some(timeframe) = self.timeframe {
            config.timeframe = timeframe;
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(offset) = self.offset {
            config.offset = offset;
        }
        if let Some(out_dir) = &self.out_dir {
            config.output_dir.clone_from(out_dir);
        }
        config.stats_csv |= self.stats_csv;
        Ok(config)
    }
}

fn print_output(output: &RunOutput, detailed: bool) {
    let report = &output.analysis.report;
    println!(
        "{} ({} candles)",
        output.analysis.bucketing.title(),
        report.observation_count
    );
    let lines = if detailed {
        detail_lines(report)
    } else {
        summary_lines(report)
    };
    for line in lines {
        println!("  {line}");
    }
    println!("  chart: {}", output.chart_path.display());
    if let Some(stats) = &output.stats_path {
        println!("  stats: {}", stats.display());
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config()?;
    info!(
        symbol = %config.symbol,
        timeframe = %config.timeframe,
        db = %config.storage_location.display(),
        "Starting seasonality analysis"
    );

    let mut runner = SeasonalityRunner::open_sqlite(config)?;
    if let Some(now) = cli.now {
        runner = runner.with_now(now);
    }

    let outputs = match cli.target.bucketing() {
        Some(bucketing) => vec![runner.run(bucketing)?],
        None => runner.run_all()?,
    };
    for output in &outputs {
        print_output(output, cli.detailed);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Seasonality analysis failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
