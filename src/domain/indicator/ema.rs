//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_ema(candles: &[Candle], period: usize) -> IndicatorSeries {
    if period == 0 || candles.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Ema(period));
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema = ema_over(&closes, period);

    let values = candles
        .iter()
        .zip(ema)
        .enumerate()
        .map(|(i, (candle, v))| IndicatorPoint {
            date: candle.date,
            valid: i >= period - 1,
            value: IndicatorValue::Simple(v),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// EMA over a raw value slice. Warmup entries hold 0.0; the caller decides
/// validity from the period. Shared with the MACD signal line, which smooths
/// a derived series rather than closes.
pub(crate) fn ema_over(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if i < period - 1 {
            sum += v;
            out.push(0.0);
        } else if i == period - 1 {
            sum += v;
            ema = sum / period as f64;
            out.push(ema);
        } else {
            ema = v * k + ema * (1.0 - k);
            out.push(ema);
        }
    }

    out
}
