//! Composite Screening Score (CSS).
//!
//! Four sub-scores in [0,100] combine into a weighted sum, followed by a
//! strictly ordered adjustment pipeline: volume/alignment bonuses, a clamp,
//! and a final falling-knife cap. The order is part of the contract — the
//! cap must see the clamped value, not the other way round.

use crate::domain::snapshot::{IndicatorSet, MaAlignment, TrendLabel};

pub const TREND_WEIGHT: f64 = 0.30;
pub const MOMENTUM_WEIGHT: f64 = 0.25;
pub const VOLATILITY_WEIGHT: f64 = 0.20;
pub const SIGNAL_WEIGHT: f64 = 0.25;

/// CSS ceiling when a strong bearish trend is in force. Oversold readings
/// inside such a trend are continuation signals, not reversal entries.
pub const FALLING_KNIFE_CAP: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSignal {
    Opportunity,
    Neutral,
    Avoid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreeningResult {
    pub css: f64,
    pub trend_score: f64,
    pub momentum_score: f64,
    pub volatility_score: f64,
    pub signal_score: f64,
    pub signal: TradeSignal,
}

/// Trend sub-score: base 80/50/20 by trend label, ADX strength adjustments,
/// +10 when the short average is above the medium one.
pub fn trend_score(set: &IndicatorSet) -> f64 {
    let mut score: f64 = match set.trend {
        TrendLabel::Bullish => 80.0,
        TrendLabel::Neutral => 50.0,
        TrendLabel::Bearish => 20.0,
    };

    if let Some(adx) = set.adx {
        if adx > 25.0 {
            match set.trend {
                TrendLabel::Bullish => score += 10.0,
                TrendLabel::Bearish => score -= 10.0,
                TrendLabel::Neutral => {}
            }
        }
        if adx > 35.0 && set.trend == TrendLabel::Bearish {
            score -= 20.0;
        }
    }

    if let (Some(s20), Some(s50)) = (set.sma_20, set.sma_50) {
        if s20 > s50 {
            score += 10.0;
        }
    }

    score.clamp(0.0, 100.0)
}

/// Momentum sub-score: RSI sets the base, stochastic and MACD shift it.
pub fn momentum_score(set: &IndicatorSet) -> f64 {
    let mut score: f64 = match set.rsi {
        Some(rsi) if rsi < 30.0 => 80.0,
        Some(rsi) if rsi > 70.0 => 30.0,
        _ => 50.0,
    };

    if let Some(stoch) = &set.stochastic {
        if stoch.k < 20.0 {
            score += 15.0;
        } else if stoch.k > 80.0 {
            score -= 15.0;
        }
    }

    if let Some(macd) = &set.macd {
        if macd.histogram > 0.0 {
            score += 10.0;
            if set.prev_histogram.is_some_and(|prev| prev <= 0.0) {
                score += 15.0;
            }
        }
    }

    score.clamp(0.0, 100.0)
}

/// Volatility sub-score: ATR% sweet-spot buckets plus Bollinger position.
pub fn volatility_score(set: &IndicatorSet) -> f64 {
    let mut score: f64 = match set.atr_pct() {
        None => 50.0,
        Some(pct) if pct < 1.0 => 70.0,
        Some(pct) if pct <= 3.0 => 85.0,
        Some(pct) if pct <= 5.0 => 60.0,
        Some(_) => 40.0,
    };

    if let Some(bb) = &set.bollinger {
        if set.price < bb.lower {
            score += 10.0;
        } else if set.price > bb.upper {
            score -= 10.0;
        }
    }

    score.clamp(0.0, 100.0)
}

/// Signal sub-score: net bullish minus bearish tags around a 50 midpoint.
pub fn signal_score(set: &IndicatorSet) -> f64 {
    let net = set.bullish_signals() as f64 - set.bearish_signals() as f64;
    (50.0 + net * 12.5).clamp(0.0, 100.0)
}

fn volume_alignment_adjustments(set: &IndicatorSet, mut css: f64) -> f64 {
    if let Some(rvol) = set.rvol {
        if rvol > 1.5 {
            css += 5.0;
        } else if rvol < 0.5 {
            css -= 5.0;
        }
    }
    match set.ma_alignment {
        MaAlignment::MostlyBullish => css += 5.0,
        MaAlignment::MostlyBearish => css -= 10.0,
        _ => {}
    }
    css
}

fn falling_knife_cap(set: &IndicatorSet, css: f64) -> f64 {
    let strong_bearish =
        set.trend == TrendLabel::Bearish && set.adx.is_some_and(|adx| adx > 35.0);
    if strong_bearish {
        css.min(FALLING_KNIFE_CAP)
    } else {
        css
    }
}

fn label(set: &IndicatorSet, css: f64) -> TradeSignal {
    let oversold = set.rsi.is_some_and(|rsi| rsi < 30.0);
    if css >= 65.0 && (set.trend == TrendLabel::Bullish || oversold) {
        TradeSignal::Opportunity
    } else if css < 45.0 || set.trend == TrendLabel::Bearish {
        TradeSignal::Avoid
    } else {
        TradeSignal::Neutral
    }
}

pub fn screen(set: &IndicatorSet) -> ScreeningResult {
    let trend = trend_score(set);
    let momentum = momentum_score(set);
    let volatility = volatility_score(set);
    let signal = signal_score(set);

    let weighted = TREND_WEIGHT * trend
        + MOMENTUM_WEIGHT * momentum
        + VOLATILITY_WEIGHT * volatility
        + SIGNAL_WEIGHT * signal;

    // Ordered pipeline: bonuses, clamp, then the override cap.
    let adjusted = volume_alignment_adjustments(set, weighted);
    let clamped = adjusted.clamp(0.0, 100.0);
    let css = falling_knife_cap(set, clamped);

    ScreeningResult {
        css,
        trend_score: trend,
        momentum_score: momentum,
        volatility_score: volatility,
        signal_score: signal,
        signal: label(set, css),
    }
}
