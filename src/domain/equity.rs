//! Trailing daily equity of the held portfolio.

use chrono::{Days, NaiveDate};
use log::warn;
use std::collections::HashMap;

use crate::domain::portfolio::{EquityPoint, Portfolio};
use crate::ports::data_port::MarketDataPort;

/// Equity for each of the `days` calendar days ending at `as_of`.
///
/// Each day is `initial_cash` plus the unrealized P/L of the positions that
/// have a bar on that day; a position without a bar that day (weekend,
/// holiday, failed fetch) contributes nothing. History is fetched once per
/// position over the whole window.
pub fn build_equity_curve(
    data_port: &dyn MarketDataPort,
    portfolio: &Portfolio,
    initial_cash: f64,
    days: u64,
    as_of: NaiveDate,
) -> Vec<EquityPoint> {
    if days == 0 {
        return Vec::new();
    }
    let start = as_of
        .checked_sub_days(Days::new(days - 1))
        .unwrap_or(NaiveDate::MIN);

    let mut closes: HashMap<(String, NaiveDate), f64> = HashMap::new();
    for position in portfolio.positions() {
        match data_port.fetch_bars(&position.symbol, start, as_of) {
            Ok(bars) => {
                for bar in bars.into_iter().filter(|b| b.close.is_finite()) {
                    closes.insert((position.symbol.clone(), bar.date), bar.close);
                }
            }
            Err(e) => warn!("equity curve omits {}: {e}", position.symbol),
        }
    }

    start
        .iter_days()
        .take_while(|d| *d <= as_of)
        .map(|date| {
            let prices: HashMap<String, f64> = portfolio
                .symbols()
                .filter_map(|s| {
                    closes
                        .get(&(s.to_string(), date))
                        .map(|&c| (s.to_string(), c))
                })
                .collect();
            EquityPoint {
                date,
                equity: portfolio.total_equity(initial_cash, &prices),
            }
        })
        .collect()
}
