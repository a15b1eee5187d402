//! ADX (Average Directional Index) indicator.
//!
//! 1. +DM / -DM from consecutive bars; a move only counts when it exceeds
//!    the opposing move and zero.
//! 2. Wilder-smooth +DM, -DM, and true range over n bars (sum seed, then
//!    smoothed = smoothed - smoothed/n + current).
//! 3. DI± = 100 × smoothed DM± / smoothed TR.
//! 4. DX = 100 × |DI+ - DI-| / (DI+ + DI-).
//! 5. ADX = Wilder-smoothed DX, seeded with the mean of the first n DX
//!    values; valid from bar 2n onward.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_adx(candles: &[Candle], period: usize) -> IndicatorSeries {
    if period == 0 || candles.len() < 2 {
        return IndicatorSeries::empty(IndicatorType::Adx(period));
    }

    let n = period as f64;
    let mut values = Vec::with_capacity(candles.len());
    values.push(IndicatorPoint {
        date: candles[0].date,
        valid: false,
        value: IndicatorValue::Simple(0.0),
    });

    let mut smoothed_plus_dm = 0.0;
    let mut smoothed_minus_dm = 0.0;
    let mut smoothed_tr = 0.0;
    let mut dx_sum = 0.0;
    let mut dx_count = 0usize;
    let mut adx = 0.0;

    for i in 1..candles.len() {
        let up_move = candles[i].high - candles[i - 1].high;
        let down_move = candles[i - 1].low - candles[i].low;
        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
        let tr = candles[i].true_range(candles[i - 1].close);

        if i <= period {
            // Accumulation phase: sums double as the Wilder seed.
            smoothed_plus_dm += plus_dm;
            smoothed_minus_dm += minus_dm;
            smoothed_tr += tr;
        } else {
            smoothed_plus_dm = smoothed_plus_dm - smoothed_plus_dm / n + plus_dm;
            smoothed_minus_dm = smoothed_minus_dm - smoothed_minus_dm / n + minus_dm;
            smoothed_tr = smoothed_tr - smoothed_tr / n + tr;
        }

        if i < period {
            values.push(IndicatorPoint {
                date: candles[i].date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
            continue;
        }

        let di_plus = if smoothed_tr > 0.0 {
            100.0 * smoothed_plus_dm / smoothed_tr
        } else {
            0.0
        };
        let di_minus = if smoothed_tr > 0.0 {
            100.0 * smoothed_minus_dm / smoothed_tr
        } else {
            0.0
        };
        let di_sum = di_plus + di_minus;
        let dx = if di_sum > 0.0 {
            100.0 * (di_plus - di_minus).abs() / di_sum
        } else {
            0.0
        };

        if dx_count < period {
            dx_sum += dx;
            dx_count += 1;
            adx = dx_sum / dx_count as f64;
        } else {
            adx = (adx * (n - 1.0) + dx) / n;
        }

        values.push(IndicatorPoint {
            date: candles[i].date,
            // Full Wilder warmup: n bars of DM plus n DX samples.
            valid: i >= 2 * period,
            value: IndicatorValue::Simple(adx),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Adx(period),
        values,
    }
}
