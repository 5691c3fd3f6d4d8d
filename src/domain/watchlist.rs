//! Scan a fixed candidate list for breakouts among symbols not already held.

use chrono::NaiveDate;
use log::info;

use crate::domain::breakout::{evaluate_symbol, BreakoutResult, BreakoutRules};
use crate::domain::portfolio::Portfolio;
use crate::ports::data_port::MarketDataPort;

pub fn default_watchlist() -> Vec<String> {
    ["KLAC", "ENPH", "SOFI", "PLTR", "RIVN", "AMD", "SQ", "PYPL"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchlistScan {
    /// Candidates that broke out, in watchlist order. Empty is a valid result.
    pub hits: Vec<BreakoutResult>,
    /// Candidates evaluated (held symbols excluded).
    pub scanned: usize,
    /// Candidates whose data could not be evaluated.
    pub unavailable: Vec<String>,
}

impl WatchlistScan {
    pub fn has_hits(&self) -> bool {
        !self.hits.is_empty()
    }
}

pub fn scan_watchlist(
    data_port: &dyn MarketDataPort,
    candidates: &[String],
    portfolio: &Portfolio,
    rules: &BreakoutRules,
    as_of: NaiveDate,
) -> WatchlistScan {
    let mut scan = WatchlistScan::default();

    for symbol in candidates.iter().filter(|s| !portfolio.has_position(s)) {
        scan.scanned += 1;
        let result = evaluate_symbol(data_port, symbol, rules, as_of);
        if !result.is_available() {
            scan.unavailable.push(symbol.clone());
        } else if result.is_breakout {
            scan.hits.push(result);
        }
    }

    info!(
        "watchlist scan: {} candidates, {} breakouts, {} unavailable",
        scan.scanned,
        scan.hits.len(),
        scan.unavailable.len()
    );
    scan
}
