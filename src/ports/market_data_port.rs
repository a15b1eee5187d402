//! Market data port trait.

use crate::domain::candle::Candle;
use crate::domain::error::SwingtraderError;

pub trait MarketDataPort {
    /// The most recent `count` daily candles for a symbol, ascending.
    fn fetch_candles(&self, symbol: &str, count: usize) -> Result<Vec<Candle>, SwingtraderError>;

    /// Symbols this provider can serve.
    fn list_symbols(&self) -> Result<Vec<String>, SwingtraderError>;
}
