//! OBV (On-Balance Volume) indicator.
//!
//! Cumulative volume signed by close-to-close direction: up closes add
//! volume, down closes subtract it, unchanged closes add nothing. The first
//! bar contributes zero. Valid from the first bar.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_obv(candles: &[Candle]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    let mut obv = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        if i > 0 {
            let change = candle.close - candles[i - 1].close;
            if change > 0.0 {
                obv += candle.volume as f64;
            } else if change < 0.0 {
                obv -= candle.volume as f64;
            }
        }

        values.push(IndicatorPoint {
            date: candle.date,
            valid: true,
            value: IndicatorValue::Simple(obv),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Obv,
        values,
    }
}
