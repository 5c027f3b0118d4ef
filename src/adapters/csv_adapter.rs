//! CSV file data adapter.
//!
//! One file per ticker and interval, `{TICKER}_{interval}.csv`, with a
//! `date,open,high,low,close,volume` header.

use crate::domain::error::TickerscopeError;
use crate::domain::market::{Interval, Period};
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str, interval: Interval) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", ticker, interval))
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_field<T: FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| format!("row {}: missing {} column", row, name))?
        .trim()
        .parse()
        .map_err(|e| format!("row {}: invalid {} value: {}", row, name, e))
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        interval: Interval,
        period: Period,
    ) -> Result<Vec<OhlcvBar>, TickerscopeError> {
        let fetch_err = |reason: String| TickerscopeError::Fetch {
            ticker: ticker.to_string(),
            reason,
        };

        let path = self.csv_path(ticker, interval);
        let content = fs::read_to_string(&path)
            .map_err(|e| fetch_err(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            let row = i + 2;
            let record = result.map_err(|e| fetch_err(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| fetch_err(format!("row {}: missing date column", row)))?;
            let timestamp = parse_timestamp(date_str).ok_or_else(|| {
                fetch_err(format!("row {}: invalid date '{}'", row, date_str))
            })?;

            bars.push(OhlcvBar {
                ticker: ticker.to_string(),
                timestamp,
                open: parse_field(&record, 1, "open", row).map_err(fetch_err)?,
                high: parse_field(&record, 2, "high", row).map_err(fetch_err)?,
                low: parse_field(&record, 3, "low", row).map_err(fetch_err)?,
                close: parse_field(&record, 4, "close", row).map_err(fetch_err)?,
                volume: parse_field(&record, 5, "volume", row).map_err(fetch_err)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        if let Some(latest) = bars.last().map(|b| b.timestamp) {
            let cutoff = latest - period.nominal_duration();
            bars.retain(|b| b.timestamp >= cutoff);
        }
        tracing::debug!(ticker, path = %path.display(), rows = bars.len(), "read csv");
        Ok(bars)
    }

    fn list_symbols(&self, interval: Interval) -> Result<Vec<String>, TickerscopeError> {
        let entries = fs::read_dir(&self.base_path)?;

        let suffix = format!("_{}.csv", interval);
        let mut symbols = Vec::new();

        for entry in entries {
            let name = entry?.file_name();
            let name_str = name.to_string_lossy();

            if let Some(ticker) = name_str.strip_suffix(&suffix) {
                if !ticker.is_empty() {
                    symbols.push(ticker.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
