//! OBV (On-Balance Volume) indicator implementation.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

/// Calculate OBV (On-Balance Volume) indicator.
///
/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period; all bars are valid.
pub fn calculate_obv(bars: &[OhlcvBar]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut obv = 0.0;
    let mut prev_close: Option<f64> = None;

    for bar in bars {
        let volume = bar.volume as f64;
        obv = match prev_close {
            None => volume,
            Some(prev) if bar.close > prev => obv + volume,
            Some(prev) if bar.close < prev => obv - volume,
            Some(_) => obv,
        };
        prev_close = Some(bar.close);

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Simple(obv),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Obv,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, close: f64, volume: i64) -> OhlcvBar {
        OhlcvBar {
            ticker: "TEST".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    #[test]
    fn obv_accumulates_by_direction() {
        let bars = vec![
            make_bar(1, 10.0, 1000),
            make_bar(2, 11.0, 500),
            make_bar(3, 10.5, 300),
            make_bar(4, 10.5, 900),
        ];
        let series = calculate_obv(&bars);
        let obv: Vec<f64> = series
            .values
            .iter()
            .map(|p| match p.value {
                IndicatorValue::Simple(v) => v,
                _ => panic!("Expected Simple value"),
            })
            .collect();
        assert_eq!(obv, vec![1000.0, 1500.0, 1200.0, 1200.0]);
    }

    #[test]
    fn obv_all_points_valid() {
        let bars = vec![make_bar(1, 10.0, 1), make_bar(2, 9.0, 1)];
        assert_eq!(calculate_obv(&bars).valid_count(), 2);
    }

    #[test]
    fn obv_empty() {
        let series = calculate_obv(&[]);
        assert!(series.values.is_empty());
        assert_eq!(series.indicator_type, IndicatorType::Obv);
    }
}
