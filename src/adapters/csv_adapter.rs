//! CSV candle file adapter.
//!
//! One file per symbol (`<SYMBOL>.csv`), columns
//! `date,open,high,low,close,volume` with ISO dates. Rows are sorted by
//! date after parsing; series validation happens in the domain.

use crate::domain::candle::Candle;
use crate::domain::error::SwingtraderError;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

/// Parse one candle file. Usable directly by the CLI for ad-hoc files
/// outside a per-symbol directory layout.
pub fn load_candles<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>, SwingtraderError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| SwingtraderError::CandleFile {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut candles = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| SwingtraderError::CandleFile {
            reason: format!("row {}: {}", row + 1, e),
        })?;

        let field = |idx: usize, name: &str| -> Result<&str, SwingtraderError> {
            record.get(idx).ok_or_else(|| SwingtraderError::CandleFile {
                reason: format!("row {}: missing {} column", row + 1, name),
            })
        };
        let parse_f64 = |idx: usize, name: &str| -> Result<f64, SwingtraderError> {
            field(idx, name)?
                .parse()
                .map_err(|e| SwingtraderError::CandleFile {
                    reason: format!("row {}: invalid {}: {}", row + 1, name, e),
                })
        };

        let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d").map_err(|e| {
            SwingtraderError::CandleFile {
                reason: format!("row {}: invalid date: {}", row + 1, e),
            }
        })?;

        candles.push(Candle {
            date,
            open: parse_f64(1, "open")?,
            high: parse_f64(2, "high")?,
            low: parse_f64(3, "low")?,
            close: parse_f64(4, "close")?,
            volume: field(5, "volume")?.parse().map_err(|e| {
                SwingtraderError::CandleFile {
                    reason: format!("row {}: invalid volume: {}", row + 1, e),
                }
            })?,
        });
    }

    candles.sort_by_key(|c| c.date);
    Ok(candles)
}

impl MarketDataPort for CsvAdapter {
    fn fetch_candles(&self, symbol: &str, count: usize) -> Result<Vec<Candle>, SwingtraderError> {
        let mut candles = load_candles(self.csv_path(symbol))?;
        if candles.len() > count {
            candles.drain(..candles.len() - count);
        }
        Ok(candles)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SwingtraderError::CandleFile {
            reason: format!("failed to read {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SwingtraderError::CandleFile {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";

        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("SPY.csv"), "date,open,high,low,close,volume\n").unwrap();

        (dir, path)
    }

    #[test]
    fn load_candles_sorts_by_date() {
        let (_dir, path) = setup_test_data();
        let candles = load_candles(path.join("AAPL.csv")).unwrap();

        assert_eq!(candles.len(), 3);
        assert_eq!(
            candles[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].volume, 50000);
        assert_eq!(
            candles[2].date,
            NaiveDate::from_ymd_opt(2024, 1, 17).unwrap()
        );
    }

    #[test]
    fn fetch_candles_tails_to_count() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.fetch_candles("AAPL", 2).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(
            candles[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
    }

    #[test]
    fn fetch_candles_missing_file_errors() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch_candles("XYZ", 10).is_err());
    }

    #[test]
    fn malformed_row_errors_with_row_number() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("BAD.csv");
        fs::write(
            &bad,
            "date,open,high,low,close,volume\n2024-01-15,abc,110.0,90.0,105.0,50000\n",
        )
        .unwrap();

        let err = load_candles(&bad).unwrap_err();
        assert!(err.to_string().contains("row 1"));
        assert!(err.to_string().contains("open"));
    }

    #[test]
    fn list_symbols_finds_csv_files() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["AAPL", "SPY"]);
    }
}
