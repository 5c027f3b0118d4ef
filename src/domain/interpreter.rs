//! Indicator interpretation: turns the latest RSI and Bollinger readings into
//! human-readable insights.
//!
//! Rules run independently and in a fixed order (RSI, then bands), each
//! contributing exactly one insight. A series too short for either lookback
//! window is reported as [`TickerscopeError::InsufficientData`] instead of
//! being classified on placeholder values.

use crate::domain::error::TickerscopeError;
use crate::domain::indicator::bollinger::{self, DEFAULT_STDDEV_MULT_X100};
use crate::domain::indicator::{rsi, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::indicator_helpers::compute_indicator;
use crate::domain::price_series::PriceSeries;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub bollinger_period: usize,
    pub bollinger_stddev_mult_x100: u32,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            rsi_period: rsi::DEFAULT_PERIOD,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_stddev_mult_x100: DEFAULT_STDDEV_MULT_X100,
        }
    }
}

impl InterpreterConfig {
    pub fn rsi_indicator(&self) -> IndicatorType {
        IndicatorType::Rsi(self.rsi_period)
    }

    pub fn bollinger_indicator(&self) -> IndicatorType {
        IndicatorType::Bollinger {
            period: self.bollinger_period,
            stddev_mult_x100: self.bollinger_stddev_mult_x100,
        }
    }

    /// Indicators the rules read, in rule order.
    pub fn required_indicators(&self) -> [IndicatorType; 2] {
        [self.rsi_indicator(), self.bollinger_indicator()]
    }
}

/// One interpreted signal, as display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Insight(String);

impl Insight {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    AboveUpper,
    BelowLower,
    Within,
}

pub fn classify_rsi(value: f64, config: &InterpreterConfig) -> RsiZone {
    if value > config.rsi_overbought {
        RsiZone::Overbought
    } else if value < config.rsi_oversold {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    }
}

pub fn rsi_insight(value: f64, config: &InterpreterConfig) -> Insight {
    let text = match classify_rsi(value, config) {
        RsiZone::Overbought => format!(
            "RSI is {:.2} (Overbought). Price might reverse or consolidate.",
            value
        ),
        RsiZone::Oversold => format!("RSI is {:.2} (Oversold). Price might rebound.", value),
        RsiZone::Neutral => format!("RSI is {:.2} (Neutral).", value),
    };
    Insight(text)
}

pub fn band_position(close: f64, upper: f64, lower: f64) -> BandPosition {
    if close > upper {
        BandPosition::AboveUpper
    } else if close < lower {
        BandPosition::BelowLower
    } else {
        BandPosition::Within
    }
}

pub fn band_insight(close: f64, upper: f64, lower: f64) -> Insight {
    let text = match band_position(close, upper, lower) {
        BandPosition::AboveUpper => format!(
            "Price is above the upper Bollinger Band (${:.2}). Potential overbought condition.",
            upper
        ),
        BandPosition::BelowLower => format!(
            "Price is below the lower Bollinger Band (${:.2}). Potential oversold condition.",
            lower
        ),
        BandPosition::Within => format!(
            "Price is within Bollinger Bands (High: ${:.2}, Low: ${:.2}). No extremes detected.",
            upper, lower
        ),
    };
    Insight(text)
}

/// Interpret a series, computing the indicators the rules need.
pub fn interpret(
    series: &PriceSeries,
    config: &InterpreterConfig,
) -> Result<Vec<Insight>, TickerscopeError> {
    interpret_with(series, &BTreeMap::new(), config)
}

/// Interpret a series, reusing any of the required indicators already in `computed`.
pub fn interpret_with(
    series: &PriceSeries,
    computed: &BTreeMap<IndicatorType, IndicatorSeries>,
    config: &InterpreterConfig,
) -> Result<Vec<Insight>, TickerscopeError> {
    let mut insights = Vec::with_capacity(2);

    let rsi = latest_value(series, computed, config.rsi_indicator())?;
    if let IndicatorValue::Simple(value) = rsi {
        insights.push(rsi_insight(value, config));
    }

    let bands = latest_value(series, computed, config.bollinger_indicator())?;
    if let IndicatorValue::Bollinger { upper, lower, .. } = bands {
        insights.push(band_insight(series.latest().close, upper, lower));
    }

    Ok(insights)
}

fn latest_value(
    series: &PriceSeries,
    computed: &BTreeMap<IndicatorType, IndicatorSeries>,
    indicator: IndicatorType,
) -> Result<IndicatorValue, TickerscopeError> {
    let insufficient = || TickerscopeError::InsufficientData {
        indicator: indicator.to_string(),
        bars: series.bar_count(),
        minimum: indicator.minimum_bars(),
    };

    if series.bar_count() < indicator.minimum_bars() {
        return Err(insufficient());
    }

    let values: Cow<'_, IndicatorSeries> = match computed.get(&indicator) {
        Some(existing) if existing.values.len() == series.bar_count() => Cow::Borrowed(existing),
        _ => Cow::Owned(compute_indicator(series.bars(), indicator)),
    };

    values
        .latest_valid()
        .map(|p| p.value.clone())
        .ok_or_else(insufficient)
}
