//! Stop-loss evaluation of held positions against their latest price.

use chrono::NaiveDate;
use log::warn;

use crate::domain::breakout::SkipReason;
use crate::domain::error::MonitorError;
use crate::domain::ohlcv::last_close;
use crate::domain::portfolio::Portfolio;
use crate::domain::position::Position;
use crate::ports::data_port::MarketDataPort;

/// Calendar days searched backwards for the latest close, so that weekends and
/// holidays still resolve to the previous session.
pub const PRICE_LOOKBACK_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct StopLossVerdict {
    pub symbol: String,
    pub current_price: f64,
    pub stop_price: f64,
    pub triggered: bool,
    /// Move relative to entry (not to stop), in percent.
    pub percent_change: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopLossStatus {
    Evaluated(StopLossVerdict),
    Unavailable { symbol: String, reason: SkipReason },
}

impl StopLossStatus {
    pub fn symbol(&self) -> &str {
        match self {
            StopLossStatus::Evaluated(v) => &v.symbol,
            StopLossStatus::Unavailable { symbol, .. } => symbol,
        }
    }

    pub fn verdict(&self) -> Option<&StopLossVerdict> {
        match self {
            StopLossStatus::Evaluated(v) => Some(v),
            StopLossStatus::Unavailable { .. } => None,
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.verdict().is_some_and(|v| v.triggered)
    }
}

pub fn evaluate(position: &Position, current_price: f64) -> StopLossVerdict {
    StopLossVerdict {
        symbol: position.symbol.clone(),
        current_price,
        stop_price: position.stop_price,
        triggered: position.should_stop_loss(current_price),
        percent_change: position.percent_change(current_price),
    }
}

/// Latest close for `symbol` within [`PRICE_LOOKBACK_DAYS`] of `as_of`.
pub fn current_price(
    data_port: &dyn MarketDataPort,
    symbol: &str,
    as_of: NaiveDate,
) -> Result<f64, MonitorError> {
    let bars = data_port.fetch_trailing(symbol, PRICE_LOOKBACK_DAYS, as_of)?;
    last_close(&bars).ok_or_else(|| MonitorError::unavailable(symbol, "no recent close"))
}

/// Evaluate every position; a symbol whose price cannot be obtained is marked
/// unavailable and the rest are still evaluated.
pub fn evaluate_portfolio(
    data_port: &dyn MarketDataPort,
    portfolio: &Portfolio,
    as_of: NaiveDate,
) -> Vec<StopLossStatus> {
    portfolio
        .positions()
        .iter()
        .map(|position| match current_price(data_port, &position.symbol, as_of) {
            Ok(price) => StopLossStatus::Evaluated(evaluate(position, price)),
            Err(e) => {
                warn!("stop-loss check skipped for {}: {e}", position.symbol);
                StopLossStatus::Unavailable {
                    symbol: position.symbol.clone(),
                    reason: e.into(),
                }
            }
        })
        .collect()
}
