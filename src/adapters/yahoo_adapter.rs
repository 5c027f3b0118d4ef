//! Yahoo Finance chart API data adapter.
//!
//! `GET {base_url}/v8/finance/chart/{TICKER}?interval=..&range=..` returns
//! parallel arrays of timestamps and quote fields. Rows without a close are
//! dropped; other missing prices fall back to the close.

use crate::domain::config_validation::DEFAULT_TIMEOUT_SECS;
use crate::domain::error::TickerscopeError;
use crate::domain::market::{Interval, Period};
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str = concat!("tickerscope/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq)]
pub struct YahooSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl YahooSettings {
    /// Reads `[yahoo]`; absent keys keep their defaults.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let defaults = Self::default();
        let timeout_secs = config.get_int("yahoo", "timeout_secs", DEFAULT_TIMEOUT_SECS).max(1);
        Self {
            base_url: config
                .get_string("yahoo", "base_url")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(timeout_secs as u64),
            user_agent: config
                .get_string("yahoo", "user_agent")
                .unwrap_or(defaults.user_agent),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

fn at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

/// Turns a chart response body into bars, oldest first.
pub fn parse_chart_response(ticker: &str, body: &str) -> Result<Vec<OhlcvBar>, TickerscopeError> {
    let fetch_err = |reason: String| TickerscopeError::Fetch {
        ticker: ticker.to_string(),
        reason,
    };

    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| fetch_err(format!("malformed response: {}", e)))?;

    if let Some(err) = envelope.chart.error {
        let reason = err
            .description
            .or(err.code)
            .unwrap_or_else(|| "unknown API error".to_string());
        return Err(fetch_err(reason));
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| fetch_err("no data found, symbol may be delisted".to_string()))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars: Vec<OhlcvBar> = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;
    for (i, &secs) in result.timestamp.iter().enumerate() {
        let Some(close) = at(&quote.close, i) else {
            skipped += 1;
            continue;
        };
        let Some(timestamp) = DateTime::from_timestamp(secs, 0).map(|t| t.naive_utc()) else {
            skipped += 1;
            continue;
        };
        let bar = OhlcvBar {
            ticker: ticker.to_string(),
            timestamp,
            open: at(&quote.open, i).unwrap_or(close),
            high: at(&quote.high, i).unwrap_or(close),
            low: at(&quote.low, i).unwrap_or(close),
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        };
        let previous = bars.last().map(|b| b.timestamp);
        match previous {
            // the live bar repeats the previous timestamp with fresher prices
            Some(t) if t == timestamp => {
                if let Some(last) = bars.last_mut() {
                    *last = bar;
                }
                skipped += 1;
            }
            Some(t) if t > timestamp => skipped += 1,
            _ => bars.push(bar),
        }
    }

    if skipped > 0 {
        tracing::debug!(ticker, skipped, "dropped or merged chart rows");
    }
    Ok(bars)
}

pub struct YahooAdapter {
    client: Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new(settings: YahooSettings) -> Result<Self, TickerscopeError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent)
            .build()
            .map_err(|e| TickerscopeError::ConfigInvalid {
                section: "yahoo".to_string(),
                key: "user_agent".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: settings.base_url,
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }
}

impl DataPort for YahooAdapter {
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
        let url = self.chart_url(ticker);
        tracing::debug!(%url, interval = %interval, range = %period, "requesting chart");

        let response = self
            .client
            .get(&url)
            .query(&[("interval", interval.as_str()), ("range", period.as_str())])
            .send()
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        let body = response.text().map_err(|e| fetch_err(e.to_string()))?;

        match parse_chart_response(ticker, &body) {
            Ok(bars) => Ok(bars),
            // error envelopes arrive with 4xx statuses; prefer their description
            Err(err) if status.is_success() || body.contains("\"chart\"") => Err(err),
            Err(_) => Err(fetch_err(format!("HTTP {}", status))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "currency": "USD"},
                "timestamp": [1704205800, 1704292200, 1704378600, 1704465000],
                "indicators": {
                    "quote": [{
                        "open":   [187.15, 184.22, null, 181.99],
                        "high":   [188.44, 185.88, 183.09, 182.76],
                        "low":    [183.89, 183.43, 180.88, 180.17],
                        "close":  [185.64, 184.25, null, 181.18],
                        "volume": [82488700, 58414500, null, 62303300]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parse_skips_null_close_rows() {
        let bars = parse_chart_response("AAPL", SAMPLE).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].ticker, "AAPL");
        assert_eq!(bars[0].close, 185.64);
        assert_eq!(bars[0].volume, 82488700);
        assert_eq!(bars[2].close, 181.18);
        assert_eq!(
            bars[0].timestamp.format("%Y-%m-%d %H:%M").to_string(),
            "2024-01-02 14:30"
        );
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn parse_fills_missing_prices_from_close() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704205800],
            "indicators":{"quote":[{"open":[null],"high":[null],"low":[null],"close":[10.5],"volume":[null]}]}}],
            "error":null}}"#;
        let bars = parse_chart_response("X", body).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 10.5);
        assert_eq!(bars[0].high, 10.5);
        assert_eq!(bars[0].low, 10.5);
        assert_eq!(bars[0].volume, 0);
    }

    #[test]
    fn parse_surfaces_api_error_description() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_response("ZZZZ", body).unwrap_err();
        assert!(matches!(
            err,
            TickerscopeError::Fetch { ref ticker, ref reason }
                if ticker == "ZZZZ" && reason.contains("symbol may be delisted")
        ));
    }

    #[test]
    fn parse_empty_result_is_fetch_failure() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        assert!(matches!(
            parse_chart_response("AAPL", body),
            Err(TickerscopeError::Fetch { .. })
        ));
    }

    #[test]
    fn parse_result_without_timestamps_yields_no_bars() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse_chart_response("AAPL", body).unwrap().is_empty());
    }

    #[test]
    fn parse_repeated_live_bar_keeps_latest_row() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704119400,1704205800,1704205800],
            "indicators":{"quote":[{"close":[0.5,1.0,2.0],"volume":[10,20,35]}]}}],"error":null}}"#;
        let bars = parse_chart_response("AAPL", body).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 2.0);
        assert_eq!(bars[1].volume, 35);
    }

    #[test]
    fn parse_skips_rows_older_than_previous() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704205800,1704119400],
            "indicators":{"quote":[{"close":[1.0,2.0]}]}}],"error":null}}"#;
        let bars = parse_chart_response("AAPL", body).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 1.0);
    }

    #[test]
    fn parse_rejects_non_json() {
        let err = parse_chart_response("AAPL", "<html>rate limited</html>").unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }

    #[test]
    fn settings_from_config() {
        let config = FileConfigAdapter::from_string(
            "[yahoo]\nbase_url = http://localhost:9000/\ntimeout_secs = 3\nuser_agent = test-agent\n",
        )
        .unwrap();
        let settings = YahooSettings::from_config(&config);
        assert_eq!(settings.base_url, "http://localhost:9000");
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.user_agent, "test-agent");
    }

    #[test]
    fn settings_default_when_section_missing() {
        let config = FileConfigAdapter::from_string("").unwrap();
        assert_eq!(YahooSettings::from_config(&config), YahooSettings::default());
    }

    #[test]
    fn chart_url_includes_ticker() {
        let adapter = YahooAdapter::new(YahooSettings {
            base_url: "http://example.test".to_string(),
            ..YahooSettings::default()
        })
        .unwrap();
        assert_eq!(
            adapter.chart_url("MSFT"),
            "http://example.test/v8/finance/chart/MSFT"
        );
    }
}
