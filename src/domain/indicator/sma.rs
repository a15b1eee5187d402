//! Simple Moving Average indicator.
//!
//! Rolling mean of closes over n bars. Warmup: first (n-1) bars are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_sma(candles: &[Candle], period: usize) -> IndicatorSeries {
    if period == 0 || candles.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Sma(period));
    }

    let mut values = Vec::with_capacity(candles.len());
    let mut window_sum = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        window_sum += candle.close;
        if i >= period {
            window_sum -= candles[i - period].close;
        }

        let valid = i >= period - 1;
        let sma = if valid { window_sum / period as f64 } else { 0.0 };

        values.push(IndicatorPoint {
            date: candle.date,
            valid,
            value: IndicatorValue::Simple(sma),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_candles(prices: &[f64]) -> Vec<Candle> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&candles, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn sma_rolling_mean() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&candles, 3);

        if let IndicatorValue::Simple(v) = series.values[2].value {
            assert!((v - 20.0).abs() < 1e-10);
        }
        if let IndicatorValue::Simple(v) = series.values[3].value {
            assert!((v - 30.0).abs() < 1e-10);
        }
    }

    #[test]
    fn sma_period_1_tracks_close() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_sma(&candles, 1);

        for (i, &expected) in [10.0, 20.0, 30.0].iter().enumerate() {
            assert!(series.values[i].valid);
            if let IndicatorValue::Simple(v) = series.values[i].value {
                assert!((v - expected).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn sma_empty_and_zero_period() {
        assert!(calculate_sma(&[], 3).values.is_empty());
        let candles = make_candles(&[10.0]);
        assert!(calculate_sma(&candles, 0).values.is_empty());
    }

    #[test]
    fn sma_longer_than_history_all_invalid() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_sma(&candles, 5);
        assert!(series.values.iter().all(|p| !p.valid));
        assert!(series.last().is_none());
    }
}
