//! Stochastic oscillator.
//!
//! %K = 100 × (close - LowestLow(k)) / (HighestHigh(k) - LowestLow(k))
//! %D = SMA(d) of %K
//!
//! A flat window (HighestHigh == LowestLow) pins %K at 50 rather than
//! dividing by zero. Warmup: (k-1) bars for %K plus (d-1) more for %D.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_stochastic(
    candles: &[Candle],
    k_period: usize,
    d_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Stochastic { k_period, d_period };
    if k_period == 0 || d_period == 0 || candles.is_empty() {
        return IndicatorSeries::empty(indicator_type);
    }

    let mut k_values = vec![0.0; candles.len()];
    for i in (k_period - 1)..candles.len() {
        let window = &candles[i + 1 - k_period..=i];
        let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        let range = highest - lowest;
        k_values[i] = if range > 0.0 {
            100.0 * (candles[i].close - lowest) / range
        } else {
            50.0
        };
    }

    let warmup = k_period - 1 + d_period - 1;
    let mut values = Vec::with_capacity(candles.len());

    for (i, candle) in candles.iter().enumerate() {
        let valid = i >= warmup;
        let (k, d) = if valid {
            let d = k_values[i + 1 - d_period..=i].iter().sum::<f64>() / d_period as f64;
            (k_values[i], d)
        } else {
            (0.0, 0.0)
        };

        values.push(IndicatorPoint {
            date: candle.date,
            valid,
            value: IndicatorValue::Stochastic { k, d },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
