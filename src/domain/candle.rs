//! OHLCV candle representation and series validation.

use chrono::NaiveDate;

use crate::domain::error::SwingtraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Candle {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// (high + low) / 2 — the rolling midpoint used by ATR band indicators.
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Validate a candle series before any indicator work.
///
/// Empty series, non-finite prices, inverted high/low, and dates that are
/// not strictly ascending are fatal: no partial result is produced from a
/// malformed series. Short-but-well-formed series pass — insufficient
/// history degrades individual indicator fields instead.
pub fn validate_series(candles: &[Candle]) -> Result<(), SwingtraderError> {
    if candles.is_empty() {
        return Err(SwingtraderError::NoCandles);
    }

    for (i, c) in candles.iter().enumerate() {
        if !(c.open.is_finite() && c.high.is_finite() && c.low.is_finite() && c.close.is_finite()) {
            return Err(SwingtraderError::MalformedCandle {
                index: i,
                reason: "non-finite price".into(),
            });
        }
        if c.high < c.low {
            return Err(SwingtraderError::MalformedCandle {
                index: i,
                reason: format!("high {} below low {}", c.high, c.low),
            });
        }
        if c.volume < 0 {
            return Err(SwingtraderError::MalformedCandle {
                index: i,
                reason: format!("negative volume {}", c.volume),
            });
        }
        if i > 0 && candles[i - 1].date >= c.date {
            return Err(SwingtraderError::NonMonotonicCandles { index: i });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn typical_price() {
        let c = bar("2024-01-15", 100.0, 110.0, 90.0, 105.0);
        let expected = (110.0 + 90.0 + 105.0) / 3.0;
        assert!((c.typical_price() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn midpoint() {
        let c = bar("2024-01-15", 100.0, 110.0, 90.0, 105.0);
        assert!((c.midpoint() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_hl_dominates() {
        let c = bar("2024-01-15", 100.0, 110.0, 90.0, 105.0);
        assert!((c.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let c = bar("2024-01-15", 100.0, 110.0, 90.0, 105.0);
        // |110 - 70| = 40 dominates
        assert!((c.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let c = bar("2024-01-15", 100.0, 110.0, 90.0, 105.0);
        // |90 - 130| = 40 dominates
        assert!((c.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rejects_empty() {
        assert!(matches!(
            validate_series(&[]),
            Err(SwingtraderError::NoCandles)
        ));
    }

    #[test]
    fn validate_rejects_non_monotonic() {
        let candles = vec![
            bar("2024-01-02", 100.0, 101.0, 99.0, 100.5),
            bar("2024-01-01", 100.0, 101.0, 99.0, 100.5),
        ];
        assert!(matches!(
            validate_series(&candles),
            Err(SwingtraderError::NonMonotonicCandles { index: 1 })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_dates() {
        let candles = vec![
            bar("2024-01-01", 100.0, 101.0, 99.0, 100.5),
            bar("2024-01-01", 100.0, 101.0, 99.0, 100.5),
        ];
        assert!(matches!(
            validate_series(&candles),
            Err(SwingtraderError::NonMonotonicCandles { index: 1 })
        ));
    }

    #[test]
    fn validate_rejects_nan_price() {
        let candles = vec![bar("2024-01-01", f64::NAN, 101.0, 99.0, 100.5)];
        assert!(matches!(
            validate_series(&candles),
            Err(SwingtraderError::MalformedCandle { index: 0, .. })
        ));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let candles = vec![bar("2024-01-01", 100.0, 99.0, 101.0, 100.0)];
        assert!(matches!(
            validate_series(&candles),
            Err(SwingtraderError::MalformedCandle { index: 0, .. })
        ));
    }

    #[test]
    fn validate_accepts_well_formed() {
        let candles = vec![
            bar("2024-01-01", 100.0, 101.0, 99.0, 100.5),
            bar("2024-01-02", 100.5, 102.0, 100.0, 101.5),
            bar("2024-01-03", 101.5, 103.0, 101.0, 102.0),
        ];
        assert!(validate_series(&candles).is_ok());
    }
}
