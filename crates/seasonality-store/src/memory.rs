//! In-memory candle store.

use seasonality_core::{
    CandleRequest, CandleSource, LoadWindow, Observation, Result, SeasonalityError, Symbol,
    Timeframe,
};
use std::collections::HashMap;
use tracing::debug;

/// Key for a stored series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SeriesKey {
    symbol: Symbol,
    timeframe: Timeframe,
}

/// Simple in-memory candle store for testing and embedding.
///
/// Series are kept sorted by timestamp; windows are applied the same way
/// `SqliteCandleStore` applies them.
#[derive(Debug, Default)]
pub struct InMemoryCandleStore {
    series: HashMap<SeriesKey, Vec<Observation>>,
}

impl InMemoryCandleStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the series for `symbol` at `timeframe`.
    pub fn insert(
        &mut self,
        symbol: Symbol,
        timeframe: Timeframe,
        mut observations: Vec<Observation>,
    ) {
        observations.sort_by_key(|o| o.timestamp);
        debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            rows = observations.len(),
            "Stored series"
        );
        self.series.insert(SeriesKey { symbol, timeframe }, observations);
    }

    /// Builder-style [`Self::insert`].
    #[must_use]
    pub fn with_series(
        mut self,
        symbol: Symbol,
        timeframe: Timeframe,
        observations: Vec<Observation>,
    ) -> Self {
        self.insert(symbol, timeframe, observations);
        self
    }

    /// Number of stored series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns true if no series is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Restrict a chronological slice to `window`, counting back from the newest element.
#[must_use]
pub fn apply_window(observations: &[Observation], window: LoadWindow) -> &[Observation] {
    let end = observations.len().saturating_sub(window.offset);
    let start = window.limit.map_or(0, |limit| end.saturating_sub(limit));
    &observations[start..end]
}

impl CandleSource for InMemoryCandleStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load_observations(&self, request: &CandleRequest) -> Result<Vec<Observation>> {
        let key = SeriesKey {
            symbol: request.symbol.clone(),
            timeframe: request.timeframe,
        };
        let series = self
            .series
            .get(&key)
            .ok_or_else(|| SeasonalityError::DataNotAvailable {
                symbol: request.symbol.to_string(),
                timeframe: request.timeframe.to_string(),
            })?;
        Ok(apply_window(series, request.window).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn day(i: i64, open: f64) -> Observation {
        let ts: DateTime<Utc> = DateTime::from_timestamp(1_704_067_200 + i * 86_400, 0).unwrap();
        Observation::new(ts, open, open)
    }

    fn opens(obs: &[Observation]) -> Vec<f64> {
        obs.iter().map(|o| o.open).collect()
    }

    #[test]
    fn test_apply_window() {
        let data: Vec<Observation> = (0..5).map(|i| day(i, i as f64)).collect();
        assert_eq!(opens(apply_window(&data, LoadWindow::all())), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(opens(apply_window(&data, LoadWindow::latest(2))), vec![3.0, 4.0]);
        assert_eq!(
            opens(apply_window(&data, LoadWindow::latest(2).with_offset(1))),
            vec![2.0, 3.0]
        );
        assert!(apply_window(&data, LoadWindow::latest(2).with_offset(9)).is_empty());
        assert_eq!(opens(apply_window(&data, LoadWindow::latest(50))).len(), 5);
    }

    #[test]
    fn test_insert_sorts() {
        let store = InMemoryCandleStore::new().with_series(
            Symbol::new("btcusdt"),
            Timeframe::Day1,
            vec![day(2, 2.0), day(0, 0.0), day(1, 1.0)],
        );
        let req = CandleRequest::new(Symbol::new("BTCUSDT"), Timeframe::Day1);
        let loaded = store.load_observations(&req).unwrap();
        assert_eq!(opens(&loaded), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_missing_series() {
        let store = InMemoryCandleStore::new();
        assert!(store.is_empty());
        let req = CandleRequest::new(Symbol::new("BTCUSDT"), Timeframe::Week1);
        assert!(matches!(
            store.load_observations(&req),
            Err(SeasonalityError::DataNotAvailable { .. })
        ));
    }
}
