//! Protective stop and target levels.
//!
//! Primary method: Chandelier Exit anchored to the extreme of the lookback
//! window, gated by SuperTrend so a trailing stop is only offered while the
//! trend actually points the right way. Fallback method for series without
//! a full OHLC window: plain ATR multiples around the reference price.

use crate::domain::candle::{validate_series, Candle};
use crate::domain::error::SwingtraderError;
use crate::domain::indicator::{calculate_atr, calculate_supertrend, IndicatorValue};

pub const CHANDELIER_PERIOD: usize = 22;
pub const CHANDELIER_MULT: f64 = 3.0;
pub const SUPERTREND_PERIOD: usize = 14;
pub const SUPERTREND_MULT_X100: u32 = 300;

pub const FALLBACK_SL_MULT: f64 = 2.0;
pub const FALLBACK_TP_MULT: f64 = 3.0;

/// Stop distance bounds as a percentage of the reference price.
pub const MIN_SL_PCT: f64 = 1.0;
pub const MAX_SL_PCT: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMethod {
    Chandelier,
    AtrFallback,
}

/// A protective stop level for one instrument and direction.
///
/// `sl_rate` always sits on the loss side of the reference price: below it
/// for long exposure, above it for short. `tp_rate` is only produced by the
/// ATR fallback; the Chandelier stop trails and has no fixed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopLevel {
    pub sl_rate: f64,
    pub sl_pct: f64,
    pub tp_rate: Option<f64>,
    pub trend_up: bool,
    pub method: StopMethod,
}

impl StopLevel {
    /// A trailing stop may only be armed when the Chandelier gate confirms
    /// the trend for long exposure. A trailing stop on the wrong side of
    /// price would trigger immediately.
    pub fn trailing_allowed(&self, direction: Direction) -> bool {
        self.method == StopMethod::Chandelier && self.trend_up && direction == Direction::Buy
    }

    /// Stop distance as a fraction of the reference price.
    pub fn sl_distance(&self) -> f64 {
        self.sl_pct / 100.0
    }
}

/// Chandelier Exit stop:
///
/// ```text
/// long_stop  = HighestHigh(22) - 3 × ATR(22)
/// short_stop = LowestLow(22)  + 3 × ATR(22)
/// ```
///
/// The SuperTrend(14, 3) direction gates trailing: `trend_up` is its final
/// reading. Needs at least 22 bars of full OHLC history.
pub fn chandelier_stops(
    candles: &[Candle],
    price: f64,
    direction: Direction,
) -> Result<StopLevel, SwingtraderError> {
    validate_series(candles)?;
    if price <= 0.0 {
        return Err(SwingtraderError::InvalidInput {
            reason: format!("price must be positive, got {}", price),
        });
    }
    if candles.len() < CHANDELIER_PERIOD {
        return Err(SwingtraderError::InsufficientData {
            have: candles.len(),
            need: CHANDELIER_PERIOD,
        });
    }

    let atr = calculate_atr(candles, CHANDELIER_PERIOD)
        .last_simple()
        .ok_or(SwingtraderError::InsufficientData {
            have: candles.len(),
            need: CHANDELIER_PERIOD,
        })?;

    let window = &candles[candles.len() - CHANDELIER_PERIOD..];
    let highest_high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let lowest_low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);

    let stop = match direction {
        Direction::Buy => highest_high - CHANDELIER_MULT * atr,
        Direction::Sell => lowest_low + CHANDELIER_MULT * atr,
    };

    let trend_up = match calculate_supertrend(candles, SUPERTREND_PERIOD, SUPERTREND_MULT_X100)
        .last()
    {
        Some(IndicatorValue::Supertrend { trend_up, .. }) => *trend_up,
        _ => false,
    };

    let raw_pct = match direction {
        Direction::Buy => (price - stop) / price * 100.0,
        Direction::Sell => (stop - price) / price * 100.0,
    };
    let sl_pct = raw_pct.clamp(MIN_SL_PCT, MAX_SL_PCT);
    let sl_rate = if (raw_pct - sl_pct).abs() < f64::EPSILON {
        stop
    } else {
        // The raw level fell outside the allowed band; re-anchor at the bound.
        match direction {
            Direction::Buy => price * (1.0 - sl_pct / 100.0),
            Direction::Sell => price * (1.0 + sl_pct / 100.0),
        }
    };

    Ok(StopLevel {
        sl_rate,
        sl_pct,
        tp_rate: None,
        trend_up,
        method: StopMethod::Chandelier,
    })
}

/// ATR fallback stop for series without a full OHLC window:
/// SL at 2×ATR and TP at 3×ATR from the reference price, SL distance
/// clamped to [1%, 15%] of price.
pub fn atr_fallback_stops(
    price: f64,
    atr: f64,
    direction: Direction,
) -> Result<StopLevel, SwingtraderError> {
    if price <= 0.0 || atr <= 0.0 {
        return Err(SwingtraderError::InvalidInput {
            reason: format!("price and ATR must be positive, got price={} atr={}", price, atr),
        });
    }

    let sl_pct = (atr * FALLBACK_SL_MULT / price * 100.0).clamp(MIN_SL_PCT, MAX_SL_PCT);
    let sl_distance = price * sl_pct / 100.0;
    let tp_distance = atr * FALLBACK_TP_MULT;

    let (sl_rate, tp_rate) = match direction {
        Direction::Buy => (price - sl_distance, price + tp_distance),
        Direction::Sell => (price + sl_distance, price - tp_distance),
    };

    Ok(StopLevel {
        sl_rate,
        sl_pct,
        tp_rate: Some(tp_rate),
        trend_up: false,
        method: StopMethod::AtrFallback,
    })
}
