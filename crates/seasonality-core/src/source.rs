//! Source trait for loading candle observations.
//!
//! [`CandleSource`] is the seam between the aggregator and storage. Implementations
//! live in `seasonality-store`.

use std::fmt::Debug;

use crate::{
    error::Result,
    types::{CandleRequest, Observation},
};

/// A store of candle series that can be read as [`Observation`]s.
pub trait CandleSource: Debug {
    /// Returns the name of this source (e.g., "sqlite").
    fn name(&self) -> &str;

    /// Loads the requested candles in chronological order.
    ///
    /// Implementations return [`SeasonalityError::DataNotAvailable`](crate::SeasonalityError::DataNotAvailable)
    /// when the symbol/timeframe series does not exist.
    fn load_observations(&self, request: &CandleRequest) -> Result<Vec<Observation>>;
}

impl<S: CandleSource + ?Sized> CandleSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_observations(&self, request: &CandleRequest) -> Result<Vec<Observation>> {
        (**self).load_observations(request)
    }
}

impl<S: CandleSource + ?Sized> CandleSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_observations(&self, request: &CandleRequest) -> Result<Vec<Observation>> {
        (**self).load_observations(request)
    }
}
