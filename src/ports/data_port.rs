//! Data access port trait.

use crate::domain::error::TickerscopeError;
use crate::domain::market::{Interval, Period};
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Bars for `ticker` sampled at `interval`, covering the trailing `period`.
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        interval: Interval,
        period: Period,
    ) -> Result<Vec<OhlcvBar>, TickerscopeError>;

    /// Tickers available locally at `interval`. Remote sources have no catalogue.
    fn list_symbols(&self, _interval: Interval) -> Result<Vec<String>, TickerscopeError> {
        Ok(Vec::new())
    }
}
