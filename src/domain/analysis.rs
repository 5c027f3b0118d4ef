//! One analysis run: fetch a ticker's history, compute indicators, interpret.

use crate::domain::error::TickerscopeError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::indicator_set::{IndicatorSelection, IndicatorSet};
use crate::domain::interpreter::{interpret_with, Insight, InterpreterConfig};
use crate::domain::market::{Interval, Period};
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::DataPort;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

pub const DEFAULT_TICKER: &str = "AAPL";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub interval: Interval,
    pub period: Period,
    /// Bundled indicators to compute in addition to the interpreter's own.
    pub set: Option<IndicatorSet>,
    /// Indicators to display; each must be among those computed.
    pub selection: Vec<IndicatorType>,
}

impl AnalysisRequest {
    pub fn new(ticker: &str, interval: Interval, period: Period) -> Result<Self, TickerscopeError> {
        Ok(Self {
            ticker: normalize_ticker(ticker)?,
            interval,
            period,
            set: None,
            selection: Vec::new(),
        })
    }

    pub fn with_set(mut self, set: IndicatorSet) -> Self {
        self.set = Some(set);
        self
    }

    pub fn with_selection(mut self, selection: Vec<IndicatorType>) -> Self {
        self.selection = selection;
        self
    }

    /// Every indicator the run computes: the set plus the interpreter's inputs.
    pub fn computed_indicators(&self, config: &InterpreterConfig) -> Vec<IndicatorType> {
        let mut out: Vec<IndicatorType> = self.set.map(|s| s.indicators()).unwrap_or_default();
        for indicator in config.required_indicators() {
            if !out.contains(&indicator) {
                out.push(indicator);
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub request: AnalysisRequest,
    pub series: PriceSeries,
    pub indicators: BTreeMap<IndicatorType, IndicatorSeries>,
    pub selection: IndicatorSelection,
    pub insights: Vec<Insight>,
}

impl AnalysisReport {
    /// Selected series in selection order, or every computed series when nothing was selected.
    pub fn displayed(&self) -> Vec<&IndicatorSeries> {
        if self.selection.is_empty() {
            self.indicators.values().collect()
        } else {
            self.selection
                .indicators()
                .iter()
                .filter_map(|t| self.indicators.get(t))
                .collect()
        }
    }
}

/// Trims and upper-cases a ticker symbol, rejecting empty input and characters
/// outside `A-Z 0-9 . ^ = -`.
pub fn normalize_ticker(raw: &str) -> Result<String, TickerscopeError> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(TickerscopeError::InvalidTicker {
            ticker: raw.to_string(),
            reason: "ticker must not be empty".to_string(),
        });
    }
    if let Some(bad) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-')))
    {
        return Err(TickerscopeError::InvalidTicker {
            ticker: raw.to_string(),
            reason: format!("unexpected character '{}'", bad),
        });
    }
    Ok(ticker)
}

pub fn run_analysis(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
    config: &InterpreterConfig,
) -> Result<AnalysisReport, TickerscopeError> {
    info!(
        ticker = %request.ticker,
        interval = %request.interval,
        period = %request.period,
        "fetching price history"
    );
    let bars = data_port.fetch_ohlcv(&request.ticker, request.interval, request.period)?;
    debug!(rows = bars.len(), "fetched bars");

    let series = PriceSeries::new(bars)?;

    let wanted = request.computed_indicators(config);
    let indicators = compute_indicators(series.bars(), &wanted);
    debug!(count = indicators.len(), "computed indicators");

    let computed: BTreeSet<IndicatorType> = indicators.keys().copied().collect();
    let selection = IndicatorSelection::new(&request.selection, &computed)?;

    let insights = interpret_with(&series, &indicators, config)?;
    info!(insights = insights.len(), "analysis complete");

    Ok(AnalysisReport {
        request: request.clone(),
        series,
        indicators,
        selection,
        insights,
    })
}
