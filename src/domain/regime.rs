//! Market regime classification.
//!
//! The "weather check" before any single-instrument decision: trend of a
//! broad benchmark and a growth-tilt secondary benchmark, plus the
//! volatility index level, condensed into a bias and a sizing multiplier.

use crate::domain::snapshot::{IndicatorSet, TrendLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityRegime {
    Normal,
    Elevated,
    High,
    Extreme,
}

impl VolatilityRegime {
    /// Bucket boundaries are half-open: [20, 25) is ELEVATED, [25, 30) HIGH.
    pub fn from_value(value: f64) -> Self {
        if value < 20.0 {
            VolatilityRegime::Normal
        } else if value < 25.0 {
            VolatilityRegime::Elevated
        } else if value < 30.0 {
            VolatilityRegime::High
        } else {
            VolatilityRegime::Extreme
        }
    }

    pub fn sizing_adjustment(&self) -> f64 {
        match self {
            VolatilityRegime::Normal => 1.0,
            VolatilityRegime::Elevated => 0.75,
            VolatilityRegime::High => 0.5,
            VolatilityRegime::Extreme => 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketBias {
    RiskOn,
    Cautious,
    RiskOff,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketRegime {
    pub benchmark_trend: TrendLabel,
    pub secondary_trend: TrendLabel,
    pub volatility_value: f64,
    pub volatility_regime: VolatilityRegime,
    pub bias: MarketBias,
    pub sizing_adjustment: f64,
}

/// Benchmark trend from the moving-average stack: BULLISH when
/// price > SMA20 > SMA50, BEARISH when price < SMA20 < SMA50, NEUTRAL
/// otherwise (including when either average is unavailable).
pub fn benchmark_trend(set: &IndicatorSet) -> TrendLabel {
    match (set.sma_20, set.sma_50) {
        (Some(s20), Some(s50)) => {
            if set.price > s20 && s20 > s50 {
                TrendLabel::Bullish
            } else if set.price < s20 && s20 < s50 {
                TrendLabel::Bearish
            } else {
                TrendLabel::Neutral
            }
        }
        _ => TrendLabel::Neutral,
    }
}

/// Classify the overall regime from the two benchmark snapshots and the
/// volatility index level (the vol series' last close).
pub fn classify_regime(
    benchmark: &IndicatorSet,
    secondary: &IndicatorSet,
    volatility: &IndicatorSet,
) -> MarketRegime {
    let benchmark_trend = self::benchmark_trend(benchmark);
    let secondary_trend = self::benchmark_trend(secondary);
    let volatility_value = volatility.price;
    let volatility_regime = VolatilityRegime::from_value(volatility_value);

    let any_bearish =
        benchmark_trend == TrendLabel::Bearish || secondary_trend == TrendLabel::Bearish;
    let both_bullish =
        benchmark_trend == TrendLabel::Bullish && secondary_trend == TrendLabel::Bullish;

    let bias = if any_bearish || volatility_value >= 25.0 {
        MarketBias::RiskOff
    } else if both_bullish && volatility_value < 20.0 {
        MarketBias::RiskOn
    } else {
        MarketBias::Cautious
    };

    MarketRegime {
        benchmark_trend,
        secondary_trend,
        volatility_value,
        volatility_regime,
        bias,
        sizing_adjustment: volatility_regime.sizing_adjustment(),
    }
}
