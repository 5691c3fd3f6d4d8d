//! CSV directory market-data adapter for offline runs.
//!
//! Each symbol lives in `<base>/<SYMBOL>.csv` with the header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::MonitorError;
use crate::domain::ohlcv::{normalize, OhlcvBar};
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

fn column<T: FromStr>(
    record: &StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
) -> Result<T, MonitorError>
where
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| MonitorError::unavailable(symbol, format!("missing {name} column")))?
        .trim()
        .parse()
        .map_err(|e| MonitorError::unavailable(symbol, format!("invalid {name} value: {e}")))
}

impl MarketDataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, MonitorError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            MonitorError::unavailable(symbol, format!("failed to read {}: {e}", path.display()))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result
                .map_err(|e| MonitorError::unavailable(symbol, format!("CSV parse error: {e}")))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| MonitorError::unavailable(symbol, "missing date column"))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                MonitorError::unavailable(symbol, format!("invalid date format: {e}"))
            })?;

            if date < start || date > end {
                continue;
            }

            bars.push(OhlcvBar {
                symbol: symbol.to_uppercase(),
                date,
                open: column(&record, 1, "open", symbol)?,
                high: column(&record, 2, "high", symbol)?,
                low: column(&record, 3, "low", symbol)?,
                close: column(&record, 4, "close", symbol)?,
                volume: column(&record, 5, "volume", symbol)?,
            });
        }

        debug!("{symbol}: {} bars from {}", bars.len(), path.display());
        Ok(normalize(bars))
    }
}
