//! Bundled indicator sets and the user's display selection.

use crate::domain::error::TickerscopeError;
use crate::domain::indicator::bollinger::DEFAULT_STDDEV_MULT_X100;
use crate::domain::indicator::{bollinger, macd, roc, rsi, IndicatorType};
use crate::domain::indicator_parser::{DEFAULT_ATR_PERIOD, DEFAULT_MA_PERIOD};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorSet {
    Momentum,
    Volatility,
    Trend,
    Volume,
    All,
}

impl IndicatorSet {
    pub const ALL: [IndicatorSet; 5] = [
        IndicatorSet::Momentum,
        IndicatorSet::Volatility,
        IndicatorSet::Trend,
        IndicatorSet::Volume,
        IndicatorSet::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorSet::Momentum => "momentum",
            IndicatorSet::Volatility => "volatility",
            IndicatorSet::Trend => "trend",
            IndicatorSet::Volume => "volume",
            IndicatorSet::All => "all",
        }
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        match self {
            IndicatorSet::Momentum => vec![
                IndicatorType::Rsi(rsi::DEFAULT_PERIOD),
                IndicatorType::Roc(roc::DEFAULT_PERIOD),
            ],
            IndicatorSet::Volatility => vec![
                IndicatorType::Bollinger {
                    period: bollinger::DEFAULT_PERIOD,
                    stddev_mult_x100: DEFAULT_STDDEV_MULT_X100,
                },
                IndicatorType::Atr(DEFAULT_ATR_PERIOD),
                IndicatorType::Stddev(DEFAULT_MA_PERIOD),
            ],
            IndicatorSet::Trend => vec![
                IndicatorType::Sma(DEFAULT_MA_PERIOD),
                IndicatorType::Ema(DEFAULT_MA_PERIOD),
                IndicatorType::Macd {
                    fast: macd::DEFAULT_FAST,
                    slow: macd::DEFAULT_SLOW,
                    signal: macd::DEFAULT_SIGNAL,
                },
            ],
            IndicatorSet::Volume => vec![IndicatorType::Obv],
            IndicatorSet::All => [
                IndicatorSet::Momentum,
                IndicatorSet::Volatility,
                IndicatorSet::Trend,
                IndicatorSet::Volume,
            ]
            .iter()
            .flat_map(|s| s.indicators())
            .collect(),
        }
    }
}

impl fmt::Display for IndicatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorSet {
    type Err = TickerscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        IndicatorSet::ALL
            .into_iter()
            .find(|set| set.as_str() == wanted)
            .ok_or_else(|| TickerscopeError::UnknownIndicatorSet(s.to_string()))
    }
}

/// Indicators chosen for display; always a subset of those computed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndicatorSelection {
    indicators: Vec<IndicatorType>,
}

impl IndicatorSelection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates `requested` against `computed`, dropping duplicates but keeping request order.
    pub fn new(
        requested: &[IndicatorType],
        computed: &BTreeSet<IndicatorType>,
    ) -> Result<Self, TickerscopeError> {
        let mut seen = BTreeSet::new();
        let mut indicators = Vec::with_capacity(requested.len());
        for indicator in requested {
            if !computed.contains(indicator) {
                return Err(TickerscopeError::UnknownIndicator {
                    indicator: indicator.to_string(),
                });
            }
            if seen.insert(*indicator) {
                indicators.push(*indicator);
            }
        }
        Ok(Self { indicators })
    }

    pub fn indicators(&self) -> &[IndicatorType] {
        &self.indicators
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}
