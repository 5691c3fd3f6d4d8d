//! Market-data access port.

use crate::domain::error::MonitorError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::{Days, NaiveDate};

/// Source of daily price bars.
///
/// Implementations must bound every request in time: a hung request surfaces
/// as [`MonitorError::DataUnavailable`], never as an indefinite block.
pub trait MarketDataPort: Send + Sync {
    /// Daily bars for `symbol` with `start <= date <= end`, chronological.
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, MonitorError>;

    /// Bars covering the `days` calendar days ending at `as_of`.
    fn fetch_trailing(
        &self,
        symbol: &str,
        days: u64,
        as_of: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, MonitorError> {
        let start = as_of
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(NaiveDate::MIN);
        self.fetch_bars(symbol, start, as_of)
    }

    /// The bar for a single session, if the market traded that day.
    fn fetch_day(&self, symbol: &str, day: NaiveDate) -> Result<Option<OhlcvBar>, MonitorError> {
        let bars = self.fetch_bars(symbol, day, day)?;
        Ok(bars.into_iter().find(|b| b.date == day))
    }
}
