//! Breakout detection: close above the trailing high, confirmed by volume and
//! a not-yet-overbought RSI.

use chrono::NaiveDate;
use log::{debug, warn};
use std::fmt;

use crate::domain::error::MonitorError;
use crate::domain::indicator::{self, IndicatorParams};
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::MarketDataPort;

/// Thresholds and windows of the breakout rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakoutRules {
    pub indicators: IndicatorParams,
    /// Volume ratio must be strictly greater than this.
    pub volume_ratio_min: f64,
    /// RSI must be strictly less than this.
    pub rsi_max: f64,
    /// Calendar days of history requested per evaluation.
    pub lookback_days: u64,
}

impl Default for BreakoutRules {
    fn default() -> Self {
        Self {
            indicators: IndicatorParams::default(),
            volume_ratio_min: 1.3,
            rsi_max: 65.0,
            lookback_days: 100,
        }
    }
}

/// Why a symbol could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData { reason: String },
    InsufficientBars { bars: usize, minimum: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData { reason } => write!(f, "data unavailable ({reason})"),
            SkipReason::InsufficientBars { bars, minimum } => {
                write!(f, "insufficient history ({bars} of {minimum} bars)")
            }
        }
    }
}

impl From<MonitorError> for SkipReason {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::InsufficientHistory { bars, minimum, .. } => {
                SkipReason::InsufficientBars { bars, minimum }
            }
            MonitorError::DataUnavailable { reason, .. } => SkipReason::NoData { reason },
            other => SkipReason::NoData {
                reason: other.to_string(),
            },
        }
    }
}

/// Indicator values the breakout decision was made from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakoutMeasurements {
    pub current_price: f64,
    pub rolling_high: f64,
    pub volume_ratio: f64,
    pub rsi: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BreakoutDetail {
    Measured(BreakoutMeasurements),
    Unavailable(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutResult {
    pub symbol: String,
    pub is_breakout: bool,
    pub detail: BreakoutDetail,
}

/// How a breakout relates to the price the position was entered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Breakout price is above the entry price.
    Confirmed,
    Pending,
}

impl BreakoutResult {
    pub fn unavailable(symbol: &str, reason: SkipReason) -> Self {
        Self {
            symbol: symbol.to_string(),
            is_breakout: false,
            detail: BreakoutDetail::Unavailable(reason),
        }
    }

    pub fn measurements(&self) -> Option<&BreakoutMeasurements> {
        match &self.detail {
            BreakoutDetail::Measured(m) => Some(m),
            BreakoutDetail::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.measurements().is_some()
    }

    /// `None` unless this is a breakout.
    pub fn confirmation(&self, reference_price: f64) -> Option<Confirmation> {
        if !self.is_breakout {
            return None;
        }
        self.measurements().map(|m| {
            if m.current_price > reference_price {
                Confirmation::Confirmed
            } else {
                Confirmation::Pending
            }
        })
    }
}

/// Apply the breakout rule to one symbol's bars.
///
/// Short or unusable series produce an unavailable, non-breakout result.
pub fn detect_breakout(symbol: &str, bars: &[OhlcvBar], rules: &BreakoutRules) -> BreakoutResult {
    let snap = match indicator::snapshot(symbol, bars, &rules.indicators) {
        Ok(s) => s,
        Err(e) => {
            debug!("{symbol}: {e}");
            return BreakoutResult::unavailable(symbol, e.into());
        }
    };

    let volume_ratio = if snap.volume_mean > 0.0 {
        snap.volume / snap.volume_mean
    } else {
        0.0
    };

    let is_breakout = snap.close > snap.rolling_high
        && volume_ratio > rules.volume_ratio_min
        && snap.rsi < rules.rsi_max;

    BreakoutResult {
        symbol: symbol.to_string(),
        is_breakout,
        detail: BreakoutDetail::Measured(BreakoutMeasurements {
            current_price: snap.close,
            rolling_high: snap.rolling_high,
            volume_ratio,
            rsi: snap.rsi,
        }),
    }
}

/// Fetch history for `symbol` and apply the breakout rule. Never fails: fetch
/// errors become an unavailable result.
pub fn evaluate_symbol(
    data_port: &dyn MarketDataPort,
    symbol: &str,
    rules: &BreakoutRules,
    as_of: NaiveDate,
) -> BreakoutResult {
    match data_port.fetch_trailing(symbol, rules.lookback_days, as_of) {
        Ok(bars) => detect_breakout(symbol, &bars, rules),
        Err(e) => {
            warn!("breakout check skipped for {symbol}: {e}");
            BreakoutResult::unavailable(symbol, e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bar(i: usize, close: f64, high: f64, volume: i64) -> OhlcvBar {
        OhlcvBar {
            symbol: "PLTR".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64),
            open: close,
            high,
            low: close - 1.0,
            close,
            volume,
        }
    }

    /// 59 bars zig-zagging 96/99 under a 100 ceiling, then a close at 101
    /// (bar high 100.5) on 1450 volume against a 950 baseline.
    fn breakout_series() -> Vec<OhlcvBar> {
        let mut bars: Vec<OhlcvBar> = (0..59)
            .map(|i| {
                let close = if i % 2 == 0 { 96.0 } else { 99.0 };
                bar(i, close, 100.0, 950)
            })
            .collect();
        bars.push(bar(59, 101.0, 100.5, 1450));
        bars
    }

    #[test]
    fn breakout_when_all_conditions_hold() {
        let result = detect_breakout("PLTR", &breakout_series(), &BreakoutRules::default());
        let m = *result.measurements().unwrap();
        assert_relative_eq!(m.current_price, 101.0);
        assert_relative_eq!(m.rolling_high, 100.5);
        assert_relative_eq!(m.volume_ratio, 1.5, epsilon = 1e-9);
        assert!(m.rsi > 50.0 && m.rsi < 60.0, "rsi {}", m.rsi);
        assert!(result.is_breakout);
    }

    #[test]
    fn overbought_rsi_blocks_breakout() {
        // Steady climb to the ceiling keeps RSI pinned near 100.
        let mut bars: Vec<OhlcvBar> = (0..59)
            .map(|i| {
                let close = 70.0 + i as f64 * 0.5;
                bar(i, close, close, 950)
            })
            .collect();
        bars.push(bar(59, 101.0, 100.5, 1450));

        let result = detect_breakout("PLTR", &bars, &BreakoutRules::default());
        let m = *result.measurements().unwrap();
        assert!(m.current_price > m.rolling_high);
        assert_relative_eq!(m.volume_ratio, 1.5, epsilon = 1e-9);
        assert!(m.rsi > 65.0);
        assert!(!result.is_breakout);
    }

    #[test]
    fn weak_volume_blocks_breakout() {
        let mut bars = breakout_series();
        bars.last_mut().unwrap().volume = 1_000;
        let result = detect_breakout("PLTR", &bars, &BreakoutRules::default());
        assert!(result.measurements().unwrap().volume_ratio < 1.3);
        assert!(!result.is_breakout);
    }

    #[test]
    fn close_at_rolling_high_is_not_breakout() {
        let mut bars = breakout_series();
        let last = bars.last_mut().unwrap();
        last.close = 100.0;
        last.high = 100.0;
        let result = detect_breakout("PLTR", &bars, &BreakoutRules::default());
        assert!(result.is_available());
        assert!(!result.is_breakout);
    }

    #[test]
    fn short_series_is_unavailable() {
        let bars: Vec<OhlcvBar> = breakout_series().into_iter().skip(11).collect();
        assert_eq!(bars.len(), 49);
        let result = detect_breakout("PLTR", &bars, &BreakoutRules::default());
        assert!(!result.is_breakout);
        assert_eq!(
            result.detail,
            BreakoutDetail::Unavailable(SkipReason::InsufficientBars {
                bars: 49,
                minimum: 50
            })
        );
    }

    #[test]
    fn missing_last_close_is_unavailable_not_measured() {
        let mut bars = breakout_series();
        bars.last_mut().unwrap().close = f64::NAN;
        let result = detect_breakout("PLTR", &bars, &BreakoutRules::default());
        assert!(!result.is_breakout);
        assert!(!result.is_available());
        assert!(matches!(
            result.detail,
            BreakoutDetail::Unavailable(SkipReason::NoData { .. })
        ));
    }

    #[test]
    fn thresholds_are_configurable() {
        let rules = BreakoutRules {
            volume_ratio_min: 2.0,
            ..BreakoutRules::default()
        };
        assert!(!detect_breakout("PLTR", &breakout_series(), &rules).is_breakout);
    }

    #[test]
    fn zero_volume_baseline_gives_zero_ratio() {
        let bars: Vec<OhlcvBar> = (0..60).map(|i| bar(i, 50.0, 51.0, 0)).collect();
        let result = detect_breakout("PLTR", &bars, &BreakoutRules::default());
        assert_eq!(result.measurements().unwrap().volume_ratio, 0.0);
        assert!(!result.is_breakout);
    }

    #[test]
    fn confirmation_against_entry_price() {
        let result = detect_breakout("PLTR", &breakout_series(), &BreakoutRules::default());
        assert_eq!(result.confirmation(90.0), Some(Confirmation::Confirmed));
        assert_eq!(result.confirmation(105.0), Some(Confirmation::Pending));

        let none = BreakoutResult::unavailable("PLTR", SkipReason::NoData { reason: "x".into() });
        assert_eq!(none.confirmation(90.0), None);
    }

    #[test]
    fn skip_reason_from_errors() {
        let reason: SkipReason = MonitorError::unavailable("AMD", "timeout").into();
        assert_eq!(reason, SkipReason::NoData { reason: "timeout".into() });
        assert_eq!(reason.to_string(), "data unavailable (timeout)");
    }
}
