#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tickerscope::domain::error::TickerscopeError;
use tickerscope::domain::market::{Interval, Period};
pub use tickerscope::domain::ohlcv::OhlcvBar;
use tickerscope::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        _interval: Interval,
        _period: Period,
    ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TickerscopeError::Fetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }

    fn list_symbols(&self, _interval: Interval) -> Result<Vec<String>, TickerscopeError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn day(offset: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(offset)
}

pub fn make_bar(ticker: &str, offset: i64, close: f64) -> OhlcvBar {
    OhlcvBar {
        ticker: ticker.to_string(),
        timestamp: day(offset),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000,
    }
}

pub fn bars_from_closes(ticker: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(ticker, i as i64, c))
        .collect()
}

/// Oscillating series with a mild upward drift.
pub fn generate_bars(ticker: &str, count: usize) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| 100.0 + (i as f64 * 0.5).sin() * 4.0 + i as f64 * 0.05)
        .collect();
    bars_from_closes(ticker, &closes)
}

/// A gain of 42 then a loss of 13, then an unchanged tail. The gain decays
/// once by 13/14 before the loss lands, so the smoothed averages hold at 3:1
/// and RSI(14) is exactly 75.
pub fn rsi_75_closes(count: usize) -> Vec<f64> {
    let mut closes = vec![100.0, 142.0, 129.0];
    closes.resize(count, 129.0);
    closes
}

/// A gain of 14 then a loss of 39: averages at 1:3, RSI(14) is exactly 25.
pub fn rsi_25_closes(count: usize) -> Vec<f64> {
    let mut closes = vec![100.0, 114.0, 75.0];
    closes.resize(count, 75.0);
    closes
}

/// A gain of 14 then a loss of 13: averages equal, RSI(14) is exactly 50.
pub fn rsi_50_closes(count: usize) -> Vec<f64> {
    let mut closes = vec![100.0, 114.0, 101.0];
    closes.resize(count, 101.0);
    closes
}

pub fn write_csv(dir: &std::path::Path, ticker: &str, interval: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for bar in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    std::fs::write(dir.join(format!("{}_{}.csv", ticker, interval)), content).unwrap();
}
