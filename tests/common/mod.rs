#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use momentum_watch::domain::cycle::{CycleReport, Monitor};
use momentum_watch::domain::error::MonitorError;
pub use momentum_watch::domain::ohlcv::OhlcvBar;
use momentum_watch::domain::portfolio::EquityPoint;
use momentum_watch::domain::position::Position;
use momentum_watch::domain::settings::MonitorSettings;
use momentum_watch::domain::watchlist::WatchlistScan;
use momentum_watch::ports::chart_port::ChartPort;
use momentum_watch::ports::data_port::MarketDataPort;
use momentum_watch::ports::report_port::ReportPort;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, MonitorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MonitorError::unavailable(symbol, reason.clone()));
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockChart {
    pub rendered: Mutex<Vec<Vec<EquityPoint>>>,
    pub fail_with: Option<String>,
}

impl MockChart {
    pub fn failing(reason: &str) -> Self {
        Self {
            rendered: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn last(&self) -> Option<Vec<EquityPoint>> {
        self.rendered.lock().unwrap().last().cloned()
    }
}

impl ChartPort for MockChart {
    fn render_equity(&self, points: &[EquityPoint], output_path: &str) -> Result<(), MonitorError> {
        if let Some(reason) = &self.fail_with {
            return Err(MonitorError::RenderFailure {
                path: output_path.to_string(),
                reason: reason.clone(),
            });
        }
        self.rendered.lock().unwrap().push(points.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct CapturingReport {
    pub cycles: Mutex<Vec<CycleReport>>,
    pub scans: Mutex<Vec<WatchlistScan>>,
    pub notices: Mutex<Vec<String>>,
}

impl CapturingReport {
    pub fn cycle_count(&self) -> usize {
        self.cycles.lock().unwrap().len()
    }

    pub fn last_cycle(&self) -> Option<CycleReport> {
        self.cycles.lock().unwrap().last().cloned()
    }

    pub fn last_scan(&self) -> Option<WatchlistScan> {
        self.scans.lock().unwrap().last().cloned()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl ReportPort for CapturingReport {
    fn write_cycle(&self, report: &CycleReport) -> Result<(), MonitorError> {
        self.cycles.lock().unwrap().push(report.clone());
        Ok(())
    }

    fn write_watchlist(&self, scan: &WatchlistScan) -> Result<(), MonitorError> {
        self.scans.lock().unwrap().push(scan.clone());
        Ok(())
    }

    fn notice(&self, message: &str) -> Result<(), MonitorError> {
        self.notices.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(symbol: &str, date: NaiveDate, close: f64, high: f64, volume: i64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date,
        open: close,
        high,
        low: close - 1.0,
        close,
        volume,
    }
}

/// `closes.len()` consecutive daily bars ending at `end`.
pub fn daily_series(symbol: &str, end: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    let n = closes.len() as u64;
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let d = end - Days::new(n - 1 - i as u64);
            make_bar(symbol, d, c, c + 1.0, 1_000)
        })
        .collect()
}

/// 60 daily bars ending at `end` whose last bar breaks out: 59 bars zig-zag
/// 96/99 under a 100 high on 950 volume, then close 101 (high 100.5) on 1450.
pub fn breakout_series(symbol: &str, end: NaiveDate) -> Vec<OhlcvBar> {
    let start = end - Days::new(59);
    let mut bars: Vec<OhlcvBar> = (0..59u64)
        .map(|i| {
            let close = if i % 2 == 0 { 96.0 } else { 99.0 };
            make_bar(symbol, start + Days::new(i), close, 100.0, 950)
        })
        .collect();
    bars.push(make_bar(symbol, end, 101.0, 100.5, 1450));
    bars
}

/// 60 flat daily bars ending at `end`; measurable but never a breakout.
pub fn quiet_series(symbol: &str, end: NaiveDate, close: f64) -> Vec<OhlcvBar> {
    daily_series(symbol, end, &[close; 60])
}

pub fn position(symbol: &str, entry: f64, shares: f64, stop: f64) -> Position {
    Position {
        symbol: symbol.to_string(),
        entry_price: entry,
        shares,
        stop_price: stop,
    }
}

pub struct Harness {
    pub data: Arc<MockDataPort>,
    pub chart: Arc<MockChart>,
    pub report: Arc<CapturingReport>,
    pub monitor: Arc<Monitor>,
}

pub fn harness(data: MockDataPort, chart: MockChart, settings: MonitorSettings) -> Harness {
    let data = Arc::new(data);
    let chart = Arc::new(chart);
    let report = Arc::new(CapturingReport::default());
    let monitor = Arc::new(Monitor::new(
        data.clone(),
        chart.clone(),
        report.clone(),
        settings,
    ));
    Harness {
        data,
        chart,
        report,
        monitor,
    }
}
