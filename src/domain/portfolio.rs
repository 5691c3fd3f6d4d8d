//! Portfolio snapshot and the process-wide store that swaps it atomically.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Immutable symbol → position mapping, in the order positions were entered.
///
/// A later position for an already-present symbol replaces the earlier one in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    positions: Vec<Position>,
}

impl Portfolio {
    pub fn new(positions: impl IntoIterator<Item = Position>) -> Self {
        let mut ordered: Vec<Position> = Vec::new();
        for position in positions {
            match ordered.iter_mut().find(|p| p.symbol == position.symbol) {
                Some(existing) => *existing = position,
                None => ordered.push(position),
            }
        }
        Portfolio { positions: ordered }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.get_position(symbol).is_some()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.positions.iter().map(|p| p.symbol.as_str())
    }

    /// `initial_cash` plus the unrealized P/L of every position with a price
    /// in `price_map`. Positions without a price contribute nothing.
    pub fn total_equity(&self, initial_cash: f64, price_map: &HashMap<String, f64>) -> f64 {
        let pnl: f64 = self
            .positions
            .iter()
            .filter_map(|pos| {
                price_map
                    .get(&pos.symbol)
                    .map(|&price| pos.unrealized_pnl(price))
            })
            .sum();
        initial_cash + pnl
    }
}

/// Shared holder of the current portfolio.
///
/// Readers take an `Arc` snapshot that stays stable for as long as they hold
/// it; [`PortfolioStore::replace`] installs a whole new portfolio in one
/// assignment, so no reader ever observes a partially updated mapping.
#[derive(Debug, Clone, Default)]
pub struct PortfolioStore {
    current: Arc<RwLock<Arc<Portfolio>>>,
}

impl PortfolioStore {
    pub fn new(portfolio: Portfolio) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(portfolio))),
        }
    }

    pub fn snapshot(&self) -> Arc<Portfolio> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace(&self, portfolio: Portfolio) {
        let next = Arc::new(portfolio);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
