//! Validated, time-ordered price history for one ticker.

use crate::domain::error::TickerscopeError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDateTime;

/// Non-empty sequence of bars with strictly increasing timestamps and finite prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<OhlcvBar>) -> Result<Self, TickerscopeError> {
        if bars.is_empty() {
            return Err(TickerscopeError::EmptySeries);
        }
        if let Some(pos) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(TickerscopeError::UnorderedSeries { index: pos + 1 });
        }
        for (index, bar) in bars.iter().enumerate() {
            let prices = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ];
            if let Some((field, _)) = prices.iter().find(|(_, v)| !v.is_finite()) {
                return Err(TickerscopeError::NonFinitePrice {
                    index,
                    field: field.to_string(),
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn ticker(&self) -> &str {
        &self.bars[0].ticker
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn latest(&self) -> &OhlcvBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn time_range(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.bars[0].timestamp, self.latest().timestamp)
    }
}
