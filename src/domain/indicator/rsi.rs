//! RSI (Relative Strength Index) indicator implementation.
//!
//! Average gain/loss are exponential means with `alpha = 1/n`, started at the
//! first bar, which contributes a zero change:
//! - avg_0 = 0
//! - avg_i = (1 - 1/n) * avg_(i-1) + x_i / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: the first n-1 bars are invalid; bar n-1 is the first valid value.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    let alpha = if period > 0 { 1.0 / period as f64 } else { 0.0 };

    for (i, bar) in bars.iter().enumerate() {
        let mut point = IndicatorPoint {
            timestamp: bar.timestamp,
            valid: false,
            value: IndicatorValue::Simple(0.0),
        };

        if period > 0 {
            let change = if i > 0 { bar.close - bars[i - 1].close } else { 0.0 };
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);

            avg_gain = (1.0 - alpha) * avg_gain + alpha * gain;
            avg_loss = (1.0 - alpha) * avg_loss + alpha * loss;

            if i + 1 >= period {
                point.valid = true;
                point.value = IndicatorValue::Simple(rsi_from_averages(avg_gain, avg_loss));
            }
        }

        values.push(point);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
