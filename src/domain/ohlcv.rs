//! OHLCV bar representation and price-series helpers.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Sort bars chronologically and drop duplicate dates, keeping the last bar
/// seen for each date.
pub fn normalize(mut bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.date == bar.date => *prev = bar,
            _ => out.push(bar),
        }
    }
    out
}

/// Most recent finite close; a trailing bar with a missing close is skipped.
pub fn last_close(bars: &[OhlcvBar]) -> Option<f64> {
    bars.iter().rev().map(|b| b.close).find(|c| c.is_finite())
}

/// Trailing percent return of a series: `(last_close / first_close - 1) * 100`.
///
/// `None` when the series is empty or the first close is not a positive number.
pub fn percent_return(bars: &[OhlcvBar]) -> Option<f64> {
    let first = bars.first()?.close;
    let last = bars.last()?.close;
    if !(first > 0.0) || !last.is_finite() {
        return None;
    }
    Some((last / first - 1.0) * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
