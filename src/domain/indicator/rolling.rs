//! Trailing-window statistics: maximum of `high` and mean of `volume`.
//!
//! The window always ends at (and includes) the bar being evaluated. The first
//! `period - 1` points are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn rolling_max_high(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    trailing(bars, period, IndicatorType::RollingHigh(period), |window| {
        window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_mean_volume(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    trailing(bars, period, IndicatorType::VolumeMean(period), |window| {
        window.iter().map(|b| b.volume as f64).sum::<f64>() / window.len() as f64
    })
}

fn trailing<F>(
    bars: &[OhlcvBar],
    period: usize,
    indicator_type: IndicatorType,
    reduce: F,
) -> IndicatorSeries
where
    F: Fn(&[OhlcvBar]) -> f64,
{
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i + 1 < period {
                IndicatorPoint {
                    date: bar.date,
                    valid: false,
                    value: 0.0,
                }
            } else {
                IndicatorPoint {
                    date: bar.date,
                    valid: true,
                    value: reduce(&bars[i + 1 - period..=i]),
                }
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
