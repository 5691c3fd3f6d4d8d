//! Technical indicators used by the breakout rule.
//!
//! Each indicator is computed as a full series aligned with the input bars;
//! bars inside the warmup window are marked invalid. [`snapshot`] reads the
//! values at the last bar and refuses to produce them when the series is too
//! short for every window to be warmed up.

pub mod rolling;
pub mod rsi;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::MonitorError;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    /// Trailing maximum of `high`, current bar included.
    RollingHigh(usize),
    /// Trailing mean of `volume`, current bar included.
    VolumeMean(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at the last bar, if that point is past warmup.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().filter(|p| p.valid).map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::RollingHigh(period) => write!(f, "HIGH({})", period),
            IndicatorType::VolumeMean(period) => write!(f, "VOLUME_MEAN({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

/// Window sizes for the indicators read by the breakout rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorParams {
    pub high_window: usize,
    pub volume_window: usize,
    pub rsi_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            high_window: 50,
            volume_window: 30,
            rsi_period: 14,
        }
    }
}

impl IndicatorParams {
    /// Minimum number of bars for every indicator to be valid at the last bar.
    /// RSI needs `period` price changes, hence `period + 1` bars.
    pub fn min_bars(&self) -> usize {
        self.high_window
            .max(self.volume_window)
            .max(self.rsi_period + 1)
    }
}

/// Indicator values at the last bar of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub volume: f64,
    pub rolling_high: f64,
    pub volume_mean: f64,
    pub rsi: f64,
}

pub fn snapshot(
    symbol: &str,
    bars: &[OhlcvBar],
    params: &IndicatorParams,
) -> Result<IndicatorSnapshot, MonitorError> {
    let minimum = params.min_bars();
    let insufficient = || MonitorError::InsufficientHistory {
        symbol: symbol.to_string(),
        bars: bars.len(),
        minimum,
    };
    if bars.len() < minimum {
        return Err(insufficient());
    }
    if let Some(bad) = bars.iter().find(|b| !b.close.is_finite()) {
        return Err(MonitorError::unavailable(
            symbol,
            format!("missing close on {}", bad.date),
        ));
    }

    let rolling_high = rolling::rolling_max_high(bars, params.high_window)
        .latest()
        .ok_or_else(insufficient)?;
    let volume_mean = rolling::rolling_mean_volume(bars, params.volume_window)
        .latest()
        .ok_or_else(insufficient)?;
    let rsi = rsi::calculate_rsi(bars, params.rsi_period)
        .latest()
        .ok_or_else(insufficient)?;

    let last = &bars[bars.len() - 1];
    Ok(IndicatorSnapshot {
        close: last.close,
        volume: last.volume as f64,
        rolling_high,
        volume_mean,
        rsi,
    })
}
