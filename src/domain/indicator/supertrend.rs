//! SuperTrend indicator — ATR bands around the bar midpoint with
//! band-locking.
//!
//! Basic bands = (high+low)/2 ± mult × ATR(n). The upper band may only
//! tighten (decrease) unless the prior close broke above it; the lower band
//! may only tighten (increase) unless the prior close broke below it. The
//! trend flips only when close crosses the active band. The line rides the
//! lower band while bullish and the upper band while bearish.

use crate::domain::candle::Candle;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_supertrend(candles: &[Candle], period: usize, mult_x100: u32) -> IndicatorSeries {
    let indicator_type = IndicatorType::Supertrend { period, mult_x100 };
    if period == 0 || candles.len() < period {
        return IndicatorSeries::empty(indicator_type);
    }

    let mult = mult_x100 as f64 / 100.0;
    let atr = calculate_atr(candles, period);
    let warmup = period - 1;

    let mut upper = vec![0.0; candles.len()];
    let mut lower = vec![0.0; candles.len()];
    let mut trend_up = vec![true; candles.len()];
    let mut values = Vec::with_capacity(candles.len());

    for (i, candle) in candles.iter().enumerate() {
        if i < warmup {
            trend_up[i] = if i > 0 { trend_up[i - 1] } else { true };
            values.push(IndicatorPoint {
                date: candle.date,
                valid: false,
                value: IndicatorValue::Supertrend {
                    line: 0.0,
                    trend_up: trend_up[i],
                },
            });
            continue;
        }

        let atr_val = match atr.values[i].value {
            IndicatorValue::Simple(v) => v,
            _ => 0.0,
        };
        let mid = candle.midpoint();
        let ub_basic = mid + mult * atr_val;
        let lb_basic = mid - mult * atr_val;

        if i == warmup {
            upper[i] = ub_basic;
            lower[i] = lb_basic;
        } else {
            let prev_close = candles[i - 1].close;
            // Band-locking: bands only tighten unless the prior close broke
            // through, which resets the band to its basic value.
            upper[i] = if ub_basic < upper[i - 1] || prev_close > upper[i - 1] {
                ub_basic
            } else {
                upper[i - 1]
            };
            lower[i] = if lb_basic > lower[i - 1] || prev_close < lower[i - 1] {
                lb_basic
            } else {
                lower[i - 1]
            };
        }

        let prev_up = if i > 0 { trend_up[i - 1] } else { true };
        trend_up[i] = if prev_up {
            candle.close >= lower[i]
        } else {
            candle.close > upper[i]
        };

        let line = if trend_up[i] { lower[i] } else { upper[i] };
        values.push(IndicatorPoint {
            date: candle.date,
            valid: true,
            value: IndicatorValue::Supertrend {
                line,
                trend_up: trend_up[i],
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_candle(day: i64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    fn trending(count: usize, start: f64, step: f64) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let base = start + i as f64 * step;
                make_candle(i as i64, base + 1.0, base - 1.0, base)
            })
            .collect()
    }

    #[test]
    fn supertrend_uptrend_is_bullish() {
        let candles = trending(40, 100.0, 2.0);
        let series = calculate_supertrend(&candles, 14, 300);

        if let Some(IndicatorValue::Supertrend { line, trend_up }) = series.last() {
            assert!(*trend_up);
            assert!(*line < candles.last().unwrap().close);
        } else {
            panic!("Expected valid supertrend");
        }
    }

    #[test]
    fn supertrend_downtrend_is_bearish() {
        let candles = trending(40, 200.0, -2.0);
        let series = calculate_supertrend(&candles, 14, 300);

        if let Some(IndicatorValue::Supertrend { line, trend_up }) = series.last() {
            assert!(!*trend_up);
            assert!(*line > candles.last().unwrap().close);
        } else {
            panic!("Expected valid supertrend");
        }
    }

    #[test]
    fn supertrend_lower_band_never_retreats_in_uptrend() {
        let candles = trending(40, 100.0, 2.0);
        let series = calculate_supertrend(&candles, 14, 300);

        let mut prev_line: Option<f64> = None;
        for point in series.values.iter().filter(|p| p.valid) {
            if let IndicatorValue::Supertrend { line, trend_up } = point.value {
                if trend_up {
                    if let Some(prev) = prev_line {
                        assert!(line >= prev - 1e-9, "lower band retreated");
                    }
                    prev_line = Some(line);
                }
            }
        }
    }

    #[test]
    fn supertrend_flips_on_reversal() {
        // 30 bars up to 158, then a selloff well below the locked lower band.
        let mut candles = trending(30, 100.0, 2.0);
        for j in 0..10i64 {
            let base = 120.0 - j as f64 * 10.0;
            candles.push(make_candle(30 + j, base + 1.0, base - 1.0, base));
        }

        let series = calculate_supertrend(&candles, 14, 300);
        if let Some(IndicatorValue::Supertrend { trend_up, .. }) = series.last() {
            assert!(!*trend_up, "selloff should flip the trend down");
        } else {
            panic!("Expected valid supertrend");
        }
    }

    #[test]
    fn supertrend_short_history_is_empty() {
        let candles = trending(5, 100.0, 1.0);
        assert!(calculate_supertrend(&candles, 14, 300).values.is_empty());
    }
}
