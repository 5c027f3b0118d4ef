//! Shared helper functions for indicator calculations.

use crate::domain::indicator::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_obv, calculate_roc,
    calculate_rsi, calculate_sma, calculate_stddev, IndicatorPoint, IndicatorSeries,
    IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;
use std::collections::BTreeMap;

/// Average True Range with Wilder smoothing, seeded by the mean of the first n true ranges.
pub fn calc_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Atr(period),
            values: vec![],
        };
    }

    let mut results: Vec<IndicatorPoint> = Vec::with_capacity(bars.len());
    let mut tr_sum = 0.0;
    let mut atr = 0.0;
    let n = period as f64;

    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            bar.high - bar.low
        } else {
            bar.true_range(bars[i - 1].close)
        };

        let valid = i + 1 >= period;
        if i + 1 < period {
            tr_sum += tr;
        } else if i + 1 == period {
            atr = (tr_sum + tr) / n;
        } else {
            atr = (atr * (n - 1.0) + tr) / n;
        }

        results.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Simple(if valid { atr } else { 0.0 }),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values: results,
    }
}

pub fn compute_indicator(bars: &[OhlcvBar], indicator: IndicatorType) -> IndicatorSeries {
    match indicator {
        IndicatorType::Sma(n) => calculate_sma(bars, n),
        IndicatorType::Ema(n) => calculate_ema(bars, n),
        IndicatorType::Rsi(n) => calculate_rsi(bars, n),
        IndicatorType::Roc(n) => calculate_roc(bars, n),
        IndicatorType::Atr(n) => calc_atr(bars, n),
        IndicatorType::Stddev(n) => calculate_stddev(bars, n),
        IndicatorType::Obv => calculate_obv(bars),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100),
    }
}

/// Computes each distinct indicator once, keyed and ordered by type.
pub fn compute_indicators(
    bars: &[OhlcvBar],
    indicators: &[IndicatorType],
) -> BTreeMap<IndicatorType, IndicatorSeries> {
    let mut out = BTreeMap::new();
    for &indicator in indicators {
        out.entry(indicator)
            .or_insert_with(|| compute_indicator(bars, indicator));
    }
    out
}
