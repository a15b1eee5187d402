//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded once MACD is warm
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Warmup: (slow - 1) + (signal - 1) bars.

use crate::domain::candle::Candle;
use crate::domain::indicator::ema::ema_over;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    candles: &[Candle],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    if candles.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries::empty(indicator_type);
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema_fast = ema_over(&closes, fast);
    let ema_slow = ema_over(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    // Signal EMA runs over the MACD line starting at MACD's first valid bar,
    // seeded with the SMA of the first `signal_period` MACD values.
    let macd_warmup = slow.max(fast) - 1;
    let mut signal_line = vec![0.0; candles.len()];
    if candles.len() > macd_warmup {
        let smoothed = ema_over(&macd_line[macd_warmup..], signal_period);
        signal_line[macd_warmup..].copy_from_slice(&smoothed);
    }

    let warmup = macd_warmup + signal_period - 1;
    let values = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let macd = macd_line[i];
            let signal = signal_line[i];
            IndicatorPoint {
                date: candle.date,
                valid: i >= warmup,
                value: IndicatorValue::Macd {
                    line: macd,
                    signal,
                    histogram: macd - signal,
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(candles: &[Candle]) -> IndicatorSeries {
    calculate_macd(candles, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
