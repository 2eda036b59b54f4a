//! SQLite candle loader.

use chrono::DateTime;
use polars::prelude::*;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use seasonality_core::{
    CandleRequest, CandleSource, Observation, Result, SeasonalityError, Symbol, Timeframe,
};
use std::path::Path;
use tracing::{debug, instrument};

/// Column holding the candle close time in epoch milliseconds.
pub const TIME_COLUMN: &str = "close_time";

/// Read-only loader for candle tables named `{SYMBOL}_{timeframe}`.
///
/// Each table must have at least `close_time` (INTEGER, epoch milliseconds),
/// `open` and `close` (REAL) columns.
#[derive(Debug)]
pub struct SqliteCandleStore {
    conn: Connection,
}

impl SqliteCandleStore {
    /// Open the candle database at `path` read-only.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| SeasonalityError::Storage(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Opened candle database");
        Ok(Self { conn })
    }

    /// Wrap an existing connection.
    ///
    /// Useful for testing with `Connection::open_in_memory()`.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Name of the table holding `symbol` candles at `timeframe`.
    ///
    /// # Errors
    /// Returns [`SeasonalityError::InvalidInput`] if the symbol is not table-safe.
    pub fn table_name(symbol: &Symbol, timeframe: Timeframe) -> Result<String> {
        symbol.validate()?;
        Ok(format!("{}_{}", symbol.as_str(), timeframe.code()))
    }

    /// Returns true if the candle table for `symbol` at `timeframe` exists.
    ///
    /// # Errors
    /// Returns an error on invalid symbols or SQLite failures.
    pub fn has_series(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<bool> {
        let table = Self::table_name(symbol, timeframe)?;
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| SeasonalityError::Storage(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Load the requested candles as a frame with columns `close_time`, `open`, `close`,
    /// sorted ascending by `close_time`.
    ///
    /// The window is applied to the newest candles first, then the result is put back
    /// in chronological order.
    ///
    /// # Errors
    /// Returns [`SeasonalityError::DataNotAvailable`] if the table does not exist.
    #[instrument(skip(self), fields(symbol = %request.symbol, timeframe = %request.timeframe))]
    pub fn load_frame(&self, request: &CandleRequest) -> Result<DataFrame> {
        if !self.has_series(&request.symbol, request.timeframe)? {
            return Err(SeasonalityError::DataNotAvailable {
                symbol: request.symbol.to_string(),
                timeframe: request.timeframe.to_string(),
            });
        }
        let table = Self::table_name(&request.symbol, request.timeframe)?;

        // SQLite treats a negative LIMIT as "no limit".
        let limit = request
            .window
            .limit
            .map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let offset = i64::try_from(request.window.offset).unwrap_or(i64::MAX);

        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {TIME_COLUMN}, open, close FROM \"{table}\"
                 ORDER BY {TIME_COLUMN} DESC
                 LIMIT ?1 OFFSET ?2"
            ))
            .map_err(|e| SeasonalityError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit, offset], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })
            .map_err(|e| SeasonalityError::Storage(e.to_string()))?;

        let mut times = Vec::new();
        let mut opens = Vec::new();
        let mut closes = Vec::new();

        for row in rows {
            let (time, open, close) = row.map_err(|e| SeasonalityError::Storage(e.to_string()))?;
            times.push(time);
            opens.push(open);
            closes.push(close);
        }

        debug!("Loaded {} candle rows from {}", times.len(), table);

        let df = DataFrame::new(vec![
            Column::new(TIME_COLUMN.into(), times),
            Column::new("open".into(), opens),
            Column::new("close".into(), closes),
        ])
        .map_err(|e| SeasonalityError::Storage(e.to_string()))?;

        df.lazy()
            .sort([TIME_COLUMN], SortMultipleOptions::default())
            .collect()
            .map_err(|e| SeasonalityError::Storage(e.to_string()))
    }
}

/// Convert a candle frame (`close_time` in epoch ms, `open`, `close`) into observations.
///
/// # Errors
/// Returns [`SeasonalityError::Parse`] on missing columns, nulls or out-of-range timestamps.
pub fn observations_from_frame(df: &DataFrame) -> Result<Vec<Observation>> {
    let times = df
        .column(TIME_COLUMN)
        .map_err(|e| SeasonalityError::Parse(e.to_string()))?
        .i64()
        .map_err(|e| SeasonalityError::Parse(e.to_string()))?;
    let opens = df
        .column("open")
        .map_err(|e| SeasonalityError::Parse(e.to_string()))?
        .f64()
        .map_err(|e| SeasonalityError::Parse(e.to_string()))?;
    let closes = df
        .column("close")
        .map_err(|e| SeasonalityError::Parse(e.to_string()))?
        .f64()
        .map_err(|e| SeasonalityError::Parse(e.to_string()))?;

    let mut observations = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let time = times
            .get(i)
            .ok_or_else(|| SeasonalityError::Parse(format!("Missing {TIME_COLUMN} in row {i}")))?;
        let open = opens
            .get(i)
            .ok_or_else(|| SeasonalityError::Parse(format!("Missing open in row {i}")))?;
        let close = closes
            .get(i)
            .ok_or_else(|| SeasonalityError::Parse(format!("Missing close in row {i}")))?;
        let timestamp = DateTime::from_timestamp_millis(time).ok_or_else(|| {
            SeasonalityError::Parse(format!("{TIME_COLUMN} {time} is out of range"))
        })?;
        observations.push(Observation::new(timestamp, open, close));
    }
    Ok(observations)
}

impl CandleSource for SqliteCandleStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn load_observations(&self, request: &CandleRequest) -> Result<Vec<Observation>> {
        let df = self.load_frame(request)?;
        observations_from_frame(&df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seasonality_core::LoadWindow;

    // 2024-01-01T00:00:00Z, one row per day
    const DAY0: i64 = 1_704_067_200_000;
    const DAY_MS: i64 = 86_400_000;

    fn store_with_days(n: i64) -> SqliteCandleStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE BTCUSDT_1d (
                open_time INTEGER NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume REAL NOT NULL,
                close_time INTEGER PRIMARY KEY
            )",
            [],
        )
        .unwrap();
        // Insert newest first to make sure ordering comes from the loader.
        for i in (0..n).rev() {
            let open = 100.0 + i as f64;
            conn.execute(
                "INSERT INTO BTCUSDT_1d VALUES (?1, ?2, ?2, ?2, ?3, 1.0, ?4)",
                params![
                    DAY0 + i * DAY_MS,
                    open,
                    open + 1.0,
                    DAY0 + i * DAY_MS + DAY_MS - 1
                ],
            )
            .unwrap();
        }
        SqliteCandleStore::from_connection(conn)
    }

    fn request() -> CandleRequest {
        CandleRequest::new(Symbol::new("btcusdt"), Timeframe::Day1)
    }

    #[test]
    fn test_table_name() {
        assert_eq!(
            SqliteCandleStore::table_name(&Symbol::new("btcusdt"), Timeframe::Month1).unwrap(),
            "BTCUSDT_1M"
        );
        assert!(SqliteCandleStore::table_name(&Symbol::new("x\"; --"), Timeframe::Day1).is_err());
    }

    #[test]
    fn test_load_all_ascending() {
        let store = store_with_days(10);
        let observations = store.load_observations(&request()).unwrap();
        assert_eq!(observations.len(), 10);
        assert!(observations.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(observations[0].open, 100.0);
        assert_eq!(observations[0].close, 101.0);
    }

    #[test]
    fn test_window_takes_newest() {
        let store = store_with_days(10);
        let req = request().with_window(LoadWindow::latest(3));
        let observations = store.load_observations(&req).unwrap();
        let opens: Vec<f64> = observations.iter().map(|o| o.open).collect();
        assert_eq!(opens, vec![107.0, 108.0, 109.0]);

        let req = request().with_window(LoadWindow::latest(3).with_offset(2));
        let observations = store.load_observations(&req).unwrap();
        let opens: Vec<f64> = observations.iter().map(|o| o.open).collect();
        assert_eq!(opens, vec![105.0, 106.0, 107.0]);
    }

    #[test]
    fn test_offset_without_limit() {
        let store = store_with_days(5);
        let req = request().with_window(LoadWindow::all().with_offset(4));
        let observations = store.load_observations(&req).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].open, 100.0);
    }

    #[test]
    fn test_frame_columns() {
        let store = store_with_days(2);
        let df = store.load_frame(&request()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.get_column_names().len(), 3);
    }

    #[test]
    fn test_missing_table() {
        let store = store_with_days(1);
        let req = CandleRequest::new(Symbol::new("ETHUSDT"), Timeframe::Day1);
        let err = store.load_observations(&req).unwrap_err();
        assert!(matches!(err, SeasonalityError::DataNotAvailable { .. }));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqliteCandleStore::open(dir.path().join("missing.db"));
        assert!(matches!(result, Err(SeasonalityError::Storage(_))));
    }

    #[test]
    fn test_open_file_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candles.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "CREATE TABLE ETHUSDT_1w (close_time INTEGER, open REAL, close REAL)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO ETHUSDT_1w VALUES (?1, 10.0, 11.0)",
                params![DAY0],
            )
            .unwrap();
        }
        let store = SqliteCandleStore::open(&path).unwrap();
        let req = CandleRequest::new(Symbol::new("ethusdt"), Timeframe::Week1);
        assert!(store.has_series(&req.symbol, req.timeframe).unwrap());
        assert_eq!(store.load_observations(&req).unwrap().len(), 1);
    }
}
