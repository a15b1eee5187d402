//! Price levels: support/resistance from local extrema, and Fibonacci
//! retracements between the series extremes.

use crate::domain::candle::Candle;

/// Support and resistance levels from centered rolling-window extrema.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportResistance {
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
    pub nearest_support: Option<f64>,
    pub nearest_resistance: Option<f64>,
}

/// Fibonacci retracement levels between a swing high and swing low.
/// `levels` maps retracement ratio to price, ordered from 0.0 (the high)
/// to 1.0 (the low).
#[derive(Debug, Clone, PartialEq)]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
    pub levels: Vec<(f64, f64)>,
}

const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Candidate levels within `tolerance` (fractional) of each other collapse
/// into the first one seen, ascending.
fn dedupe_levels(mut levels: Vec<f64>, tolerance: f64) -> Vec<f64> {
    levels.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mut deduped: Vec<f64> = Vec::with_capacity(levels.len());
    for level in levels {
        match deduped.last() {
            Some(&prev) if prev != 0.0 && (level - prev).abs() / prev <= tolerance => {}
            _ => deduped.push(level),
        }
    }
    deduped
}

/// Local price extrema within a centered rolling window, deduplicated at 2%
/// tolerance; the five highest window-highs become resistance candidates and
/// the five lowest window-lows become support candidates. Nearest levels are
/// relative to the final close. Needs at least `window` bars.
pub fn support_resistance(candles: &[Candle], window: usize) -> Option<SupportResistance> {
    if window == 0 || candles.len() < window {
        return None;
    }

    let current = candles.last()?.close;
    let half = window / 2;

    let mut highs: Vec<f64> = Vec::new();
    let mut lows: Vec<f64> = Vec::new();
    for i in half..candles.len().saturating_sub(window - half - 1) {
        let slice = &candles[i - half..i - half + window];
        let high = slice.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let low = slice.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        if !highs.contains(&high) {
            highs.push(high);
        }
        if !lows.contains(&low) {
            lows.push(low);
        }
    }

    highs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    lows.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let top_highs: Vec<f64> = highs.iter().rev().take(5).rev().copied().collect();
    let bottom_lows: Vec<f64> = lows.iter().take(5).copied().collect();

    let resistance_levels = dedupe_levels(top_highs, 0.02);
    let support_levels = dedupe_levels(bottom_lows, 0.02);

    let nearest_support = support_levels
        .iter()
        .filter(|&&s| s < current)
        .cloned()
        .fold(None, |acc: Option<f64>, s| {
            Some(acc.map_or(s, |a| a.max(s)))
        });
    let nearest_resistance = resistance_levels
        .iter()
        .filter(|&&r| r > current)
        .cloned()
        .fold(None, |acc: Option<f64>, r| {
            Some(acc.map_or(r, |a| a.min(r)))
        });

    Some(SupportResistance {
        support_levels,
        resistance_levels,
        nearest_support,
        nearest_resistance,
    })
}

/// Retracement levels measured down from the highest high to the lowest low
/// of the series.
pub fn fibonacci_retracement(candles: &[Candle]) -> Option<FibonacciLevels> {
    if candles.is_empty() {
        return None;
    }

    let high = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let diff = high - low;

    let levels = FIB_RATIOS
        .iter()
        .map(|&ratio| (ratio, high - ratio * diff))
        .collect();

    Some(FibonacciLevels { high, low, levels })
}
