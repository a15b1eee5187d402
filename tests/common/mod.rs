#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;

pub use swingtrader::domain::candle::Candle;
use swingtrader::domain::error::SwingtraderError;
use swingtrader::domain::sizing::PortfolioState;
use swingtrader::ports::market_data_port::MarketDataPort;
use swingtrader::ports::portfolio_port::PortfolioPort;

pub struct MockMarketDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn fetch_candles(&self, symbol: &str, count: usize) -> Result<Vec<Candle>, SwingtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingtraderError::CandleFile {
                reason: reason.clone(),
            });
        }
        let mut candles = self.data.get(symbol).cloned().unwrap_or_default();
        if candles.len() > count {
            candles.drain(..candles.len() - count);
        }
        Ok(candles)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub struct MockPortfolioPort {
    pub state: PortfolioState,
}

impl PortfolioPort for MockPortfolioPort {
    fn fetch_portfolio(&self) -> Result<PortfolioState, SwingtraderError> {
        Ok(self.state.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_candle(day: i64, open: f64, high: f64, low: f64, close: f64, volume: i64) -> Candle {
    Candle {
        date: date(2023, 1, 1) + chrono::Duration::days(day),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Flat series: every bar closes at `price` with a ±1 range.
pub fn flat_candles(count: usize, price: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| make_candle(i as i64, price, price + 1.0, price - 1.0, price, 1000))
        .collect()
}

/// Monotonic trend with a ±1 bar range.
pub fn trending_candles(count: usize, start: f64, step: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = start + i as f64 * step;
            make_candle(i as i64, base, base + 1.0, base - 1.0, base, 1000)
        })
        .collect()
}

/// Trend with alternating pullbacks, so oscillators stay out of their
/// extreme bands while the moving averages stack directionally.
pub fn sawtooth_candles(count: usize, start: f64, step: f64, amp: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = start + i as f64 * step + (i % 2) as f64 * amp;
            make_candle(i as i64, base, base + 1.0, base - 1.0, base, 1000)
        })
        .collect()
}

pub fn portfolio(total_value: f64, cash: f64, invested: f64) -> PortfolioState {
    PortfolioState {
        total_value,
        cash_available: cash,
        total_invested: invested,
        positions: Vec::new(),
        realized_pnl_today: 0.0,
    }
}
