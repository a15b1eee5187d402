//! Last-bar indicator snapshot over a candle series.
//!
//! [`compute_indicator_set`] runs every indicator, keeps the final-bar
//! values, and derives the qualitative reads (moving-average alignment,
//! tagged signals, overall trend label). Fields whose warmup exceeds the
//! available history are `None`; only a malformed series is an error.

use crate::domain::candle::{validate_series, Candle};
use crate::domain::error::SwingtraderError;
use crate::domain::indicator::levels::{
    fibonacci_retracement, support_resistance, FibonacciLevels, SupportResistance,
};
use crate::domain::indicator::{
    calculate_adx, calculate_atr, calculate_bollinger, calculate_ema, calculate_macd,
    calculate_obv, calculate_rsi, calculate_sma, calculate_stochastic, IndicatorValue,
};

pub const RVOL_LOOKBACK: usize = 30;
pub const SR_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendLabel {
    Bullish,
    Neutral,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaAlignment {
    Golden,
    Death,
    MostlyBullish,
    MostlyBearish,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalBias {
    Bullish,
    Bearish,
    Neutral,
}

/// One qualitative observation about the instrument, tagged with the side
/// it argues for.
#[derive(Debug, Clone)]
pub struct Signal {
    pub label: String,
    pub bias: SignalBias,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdSnapshot {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerSnapshot {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticSnapshot {
    pub k: f64,
    pub d: f64,
}

/// Snapshot of every indicator at the final bar of a candle series.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub price: f64,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub ema_8: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_21: Option<f64>,
    pub ema_26: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdSnapshot>,
    pub prev_histogram: Option<f64>,
    pub bollinger: Option<BollingerSnapshot>,
    pub atr: Option<f64>,
    pub stochastic: Option<StochasticSnapshot>,
    pub adx: Option<f64>,
    pub obv: Option<f64>,
    pub rvol: Option<f64>,
    pub gap_pct: Option<f64>,
    pub ma_alignment: MaAlignment,
    pub support_resistance: Option<SupportResistance>,
    pub fibonacci: Option<FibonacciLevels>,
    pub signals: Vec<Signal>,
    pub trend: TrendLabel,
}

impl IndicatorSet {
    /// ATR as a percentage of the reference price.
    pub fn atr_pct(&self) -> Option<f64> {
        match self.atr {
            Some(atr) if self.price > 0.0 => Some(atr / self.price * 100.0),
            _ => None,
        }
    }

    pub fn bullish_signals(&self) -> usize {
        self.signals
            .iter()
            .filter(|s| s.bias == SignalBias::Bullish)
            .count()
    }

    pub fn bearish_signals(&self) -> usize {
        self.signals
            .iter()
            .filter(|s| s.bias == SignalBias::Bearish)
            .count()
    }
}

/// Golden/death stacking of price vs EMA21 vs SMA50 vs SMA200. A missing
/// average fails both of its layer comparisons, so a short history can
/// never read GOLDEN or DEATH.
pub fn classify_alignment(
    price: f64,
    ema_21: Option<f64>,
    sma_50: Option<f64>,
    sma_200: Option<f64>,
) -> MaAlignment {
    let layer = |a: Option<f64>, b: Option<f64>| matches!((a, b), (Some(x), Some(y)) if x > y);

    let price_above_ema = layer(Some(price), ema_21);
    let ema_above_sma50 = layer(ema_21, sma_50);
    let sma50_above_sma200 = layer(sma_50, sma_200);

    let price_below_ema = layer(ema_21, Some(price));
    let ema_below_sma50 = layer(sma_50, ema_21);
    let sma50_below_sma200 = layer(sma_200, sma_50);

    let bull_layers = [price_above_ema, ema_above_sma50, sma50_above_sma200]
        .iter()
        .filter(|&&b| b)
        .count();
    let bear_layers = [price_below_ema, ema_below_sma50, sma50_below_sma200]
        .iter()
        .filter(|&&b| b)
        .count();

    if bull_layers == 3 {
        MaAlignment::Golden
    } else if bear_layers == 3 {
        MaAlignment::Death
    } else if bull_layers >= 2 {
        MaAlignment::MostlyBullish
    } else if bear_layers >= 2 {
        MaAlignment::MostlyBearish
    } else {
        MaAlignment::Mixed
    }
}

/// Last bar's volume against the mean volume of the preceding bars (up to
/// `lookback` of them). `None` when fewer than two bars or the mean is zero.
pub fn relative_volume(candles: &[Candle], lookback: usize) -> Option<f64> {
    if candles.len() < 2 {
        return None;
    }
    let current = candles.last()?.volume as f64;
    let prior = &candles[..candles.len() - 1];
    let window = if prior.len() > lookback {
        &prior[prior.len() - lookback..]
    } else {
        prior
    };
    let avg = window.iter().map(|c| c.volume as f64).sum::<f64>() / window.len() as f64;
    if avg > 0.0 {
        Some(current / avg)
    } else {
        None
    }
}

pub fn compute_indicator_set(candles: &[Candle]) -> Result<IndicatorSet, SwingtraderError> {
    validate_series(candles)?;

    let Some(last) = candles.last() else {
        return Err(SwingtraderError::NoCandles);
    };
    let price = last.close;

    let sma_20 = calculate_sma(candles, 20).last_simple();
    let sma_50 = calculate_sma(candles, 50).last_simple();
    let sma_200 = calculate_sma(candles, 200).last_simple();
    let ema_8 = calculate_ema(candles, 8).last_simple();
    let ema_12 = calculate_ema(candles, 12).last_simple();
    let ema_21 = calculate_ema(candles, 21).last_simple();
    let ema_26 = calculate_ema(candles, 26).last_simple();
    let rsi = calculate_rsi(candles, 14).last_simple();
    let atr = calculate_atr(candles, 14).last_simple();
    let adx = calculate_adx(candles, 14).last_simple();
    let obv = calculate_obv(candles).last_simple();

    let macd_series = calculate_macd(candles, 12, 26, 9);
    let macd = match macd_series.last() {
        Some(IndicatorValue::Macd {
            line,
            signal,
            histogram,
        }) => Some(MacdSnapshot {
            line: *line,
            signal: *signal,
            histogram: *histogram,
        }),
        _ => None,
    };
    let prev_histogram = match macd_series.back(1) {
        Some(IndicatorValue::Macd { histogram, .. }) => Some(*histogram),
        _ => None,
    };

    let bollinger = match calculate_bollinger(candles, 20, 200).last() {
        Some(IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        }) => Some(BollingerSnapshot {
            upper: *upper,
            middle: *middle,
            lower: *lower,
        }),
        _ => None,
    };

    let stochastic = match calculate_stochastic(candles, 14, 3).last() {
        Some(IndicatorValue::Stochastic { k, d }) => Some(StochasticSnapshot { k: *k, d: *d }),
        _ => None,
    };

    let rvol = relative_volume(candles, RVOL_LOOKBACK);
    let gap_pct = if candles.len() >= 2 {
        let prev_close = candles[candles.len() - 2].close;
        (prev_close != 0.0).then(|| (last.open - prev_close) / prev_close * 100.0)
    } else {
        None
    };

    let ma_alignment = classify_alignment(price, ema_21, sma_50, sma_200);
    let sr = support_resistance(candles, SR_WINDOW);
    let fibonacci = fibonacci_retracement(candles);

    let signals = collect_signals(
        price,
        rsi,
        macd.as_ref(),
        prev_histogram,
        bollinger.as_ref(),
        sma_20,
        sma_50,
        ma_alignment,
        rvol,
        gap_pct,
        stochastic.as_ref(),
        adx,
    );

    let bullish = signals
        .iter()
        .filter(|s| s.bias == SignalBias::Bullish)
        .count();
    let bearish = signals
        .iter()
        .filter(|s| s.bias == SignalBias::Bearish)
        .count();
    let trend = if bullish > bearish {
        TrendLabel::Bullish
    } else if bearish > bullish {
        TrendLabel::Bearish
    } else {
        TrendLabel::Neutral
    };

    Ok(IndicatorSet {
        price,
        sma_20,
        sma_50,
        sma_200,
        ema_8,
        ema_12,
        ema_21,
        ema_26,
        rsi,
        macd,
        prev_histogram,
        bollinger,
        atr,
        stochastic,
        adx,
        obv,
        rvol,
        gap_pct,
        ma_alignment,
        support_resistance: sr,
        fibonacci,
        signals,
        trend,
    })
}

#[allow(clippy::too_many_arguments)]
fn collect_signals(
    price: f64,
    rsi: Option<f64>,
    macd: Option<&MacdSnapshot>,
    prev_histogram: Option<f64>,
    bollinger: Option<&BollingerSnapshot>,
    sma_20: Option<f64>,
    sma_50: Option<f64>,
    alignment: MaAlignment,
    rvol: Option<f64>,
    gap_pct: Option<f64>,
    stochastic: Option<&StochasticSnapshot>,
    adx: Option<f64>,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    let mut push = |label: String, bias: SignalBias| signals.push(Signal { label, bias });

    if let Some(rsi) = rsi {
        if rsi < 30.0 {
            push(format!("RSI {:.0} oversold", rsi), SignalBias::Bullish);
        } else if rsi > 70.0 {
            push(format!("RSI {:.0} overbought", rsi), SignalBias::Bearish);
        }
    }

    if let (Some(macd), Some(prev)) = (macd, prev_histogram) {
        if macd.histogram > 0.0 && prev <= 0.0 {
            push("MACD bullish crossover".into(), SignalBias::Bullish);
        } else if macd.histogram < 0.0 && prev >= 0.0 {
            push("MACD bearish crossover".into(), SignalBias::Bearish);
        }
    }

    if let Some(bb) = bollinger {
        if price < bb.lower {
            push("price below lower Bollinger band".into(), SignalBias::Bullish);
        } else if price > bb.upper {
            push("price above upper Bollinger band".into(), SignalBias::Bearish);
        }
    }

    if let (Some(s20), Some(s50)) = (sma_20, sma_50) {
        if s20 > s50 {
            push("SMA20 above SMA50".into(), SignalBias::Bullish);
        } else {
            push("SMA20 below SMA50".into(), SignalBias::Bearish);
        }
    }

    match alignment {
        MaAlignment::Golden => push("golden MA alignment".into(), SignalBias::Bullish),
        MaAlignment::Death => push("death MA alignment".into(), SignalBias::Bearish),
        _ => {}
    }

    if let Some(rvol) = rvol {
        if rvol >= 2.0 {
            push(format!("RVOL {:.1}x very high volume", rvol), SignalBias::Neutral);
        } else if rvol >= 1.5 {
            push(
                format!("RVOL {:.1}x above average volume", rvol),
                SignalBias::Neutral,
            );
        } else if rvol < 0.5 {
            push(format!("RVOL {:.1}x low volume", rvol), SignalBias::Neutral);
        }
    }

    if let Some(gap) = gap_pct {
        if gap.abs() >= 1.0 {
            let direction = if gap > 0.0 { "up" } else { "down" };
            push(
                format!("gap {} {:.1}%", direction, gap.abs()),
                SignalBias::Neutral,
            );
        }
    }

    if let Some(stoch) = stochastic {
        if stoch.k < 20.0 {
            push("stochastic oversold".into(), SignalBias::Bullish);
        } else if stoch.k > 80.0 {
            push("stochastic overbought".into(), SignalBias::Bearish);
        }
    }

    if let Some(adx) = adx {
        let label = if adx > 25.0 {
            format!("ADX {:.0} strong trend", adx)
        } else {
            format!("ADX {:.0} weak trend", adx)
        };
        push(label, SignalBias::Neutral);
    }

    signals
}
