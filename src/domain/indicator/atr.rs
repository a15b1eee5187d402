//! ATR (Average True Range) indicator.
//!
//! Wilder-smoothed true range: seed with the simple mean of the first n
//! true ranges, then ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n.
//! The first bar's true range is high - low (no previous close).
//! Warmup: first (n-1) bars are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_atr(candles: &[Candle], period: usize) -> IndicatorSeries {
    if period == 0 || candles.len() < period {
        return IndicatorSeries::empty(IndicatorType::Atr(period));
    }

    let mut tr_values = Vec::with_capacity(candles.len());
    for (i, candle) in candles.iter().enumerate() {
        let tr = if i == 0 {
            candle.high - candle.low
        } else {
            candle.true_range(candles[i - 1].close)
        };
        tr_values.push(tr);
    }

    let mut values = Vec::with_capacity(candles.len());
    let mut atr = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        if i < period - 1 {
            values.push(IndicatorPoint {
                date: candle.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
            continue;
        }

        if i == period - 1 {
            atr = tr_values[..period].iter().sum::<f64>() / period as f64;
        } else {
            atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
        }

        values.push(IndicatorPoint {
            date: candle.date,
            valid: true,
            value: IndicatorValue::Simple(atr),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
