//! One monitoring pass over the held portfolio.
//!
//! A cycle walks the stages in a fixed order: sector ranking, breakout scan of
//! held positions, stop-loss evaluation, equity-curve refresh and finally the
//! report. Each stage isolates its own failures, so the pass always reaches
//! the report.

use chrono::{Local, NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::domain::breakout::{evaluate_symbol, BreakoutResult, Confirmation};
use crate::domain::equity::build_equity_curve;
use crate::domain::portfolio::{Portfolio, PortfolioStore};
use crate::domain::sector::{rank_sectors, SectorRanking};
use crate::domain::settings::MonitorSettings;
use crate::domain::stop_loss::{evaluate_portfolio, StopLossStatus};
use crate::domain::watchlist::{scan_watchlist, WatchlistScan};
use crate::ports::chart_port::ChartPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

/// Today's date in the local timezone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Idle,
    RankingSectors,
    ScanningBreakouts,
    EvaluatingStops,
    RefreshingEquityCurve,
    Reporting,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleStage::Idle => "idle",
            CycleStage::RankingSectors => "ranking sectors",
            CycleStage::ScanningBreakouts => "scanning breakouts",
            CycleStage::EvaluatingStops => "evaluating stops",
            CycleStage::RefreshingEquityCurve => "refreshing equity curve",
            CycleStage::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// Breakout check of a held position, with the entry it is judged against.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionBreakout {
    pub result: BreakoutResult,
    pub entry_price: f64,
}

impl PositionBreakout {
    pub fn confirmation(&self) -> Option<Confirmation> {
        self.result.confirmation(self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EquityOutcome {
    Rendered { path: String, points: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub generated_at: NaiveDateTime,
    pub as_of: NaiveDate,
    pub sectors: SectorRanking,
    pub breakouts: Vec<PositionBreakout>,
    pub stops: Vec<StopLossStatus>,
    pub position_count: usize,
    pub equity: EquityOutcome,
}

impl CycleReport {
    pub fn triggered_stops(&self) -> impl Iterator<Item = &StopLossStatus> {
        self.stops.iter().filter(|s| s.is_triggered())
    }
}

/// The evaluation engine shared by the scheduler and the console.
pub struct Monitor {
    data: Arc<dyn MarketDataPort>,
    chart: Arc<dyn ChartPort>,
    report: Arc<dyn ReportPort>,
    settings: MonitorSettings,
    stage: Mutex<CycleStage>,
}

impl Monitor {
    pub fn new(
        data: Arc<dyn MarketDataPort>,
        chart: Arc<dyn ChartPort>,
        report: Arc<dyn ReportPort>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            data,
            chart,
            report,
            settings,
            stage: Mutex::new(CycleStage::Idle),
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn report_port(&self) -> &dyn ReportPort {
        self.report.as_ref()
    }

    pub fn stage(&self) -> CycleStage {
        match self.stage.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn enter(&self, stage: CycleStage) {
        info!("cycle stage: {stage}");
        match self.stage.lock() {
            Ok(mut guard) => *guard = stage,
            Err(poisoned) => *poisoned.into_inner() = stage,
        }
    }

    /// Evaluate `portfolio` as of `as_of` without reporting.
    pub fn run_cycle(&self, portfolio: &Portfolio, as_of: NaiveDate) -> CycleReport {
        let s = &self.settings;
        let data = self.data.as_ref();

        self.enter(CycleStage::RankingSectors);
        let sectors = rank_sectors(
            data,
            &s.sectors,
            s.sector_lookback_days,
            s.top_sectors,
            as_of,
        );

        self.enter(CycleStage::ScanningBreakouts);
        let breakouts = portfolio
            .positions()
            .iter()
            .map(|p| PositionBreakout {
                result: evaluate_symbol(data, &p.symbol, &s.rules, as_of),
                entry_price: p.entry_price,
            })
            .collect();

        self.enter(CycleStage::EvaluatingStops);
        let stops = evaluate_portfolio(data, portfolio, as_of);

        self.enter(CycleStage::RefreshingEquityCurve);
        let points = build_equity_curve(data, portfolio, s.initial_cash, s.equity_days, as_of);
        let equity = match self.chart.render_equity(&points, &s.chart_path) {
            Ok(()) => EquityOutcome::Rendered {
                path: s.chart_path.clone(),
                points: points.len(),
            },
            Err(e) => {
                warn!("equity curve not rendered: {e}");
                EquityOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        CycleReport {
            generated_at: Local::now().naive_local(),
            as_of,
            sectors,
            breakouts,
            stops,
            position_count: portfolio.position_count(),
            equity,
        }
    }

    /// Snapshot the store once, run a full cycle and hand it to the report
    /// sink. Sink errors are logged; the report is returned regardless.
    pub fn run_and_report(&self, store: &PortfolioStore, as_of: NaiveDate) -> CycleReport {
        let portfolio = store.snapshot();
        let report = self.run_cycle(&portfolio, as_of);

        self.enter(CycleStage::Reporting);
        if let Err(e) = self.report.write_cycle(&report) {
            warn!("cycle report not written: {e}");
        }
        self.enter(CycleStage::Idle);
        report
    }

    /// Scan the watchlist against the current portfolio and report it.
    pub fn scan_and_report(&self, store: &PortfolioStore, as_of: NaiveDate) -> WatchlistScan {
        let portfolio = store.snapshot();
        let scan = scan_watchlist(
            self.data.as_ref(),
            &self.settings.watchlist,
            &portfolio,
            &self.settings.rules,
            as_of,
        );
        if let Err(e) = self.report.write_watchlist(&scan) {
            warn!("watchlist report not written: {e}");
        }
        scan
    }
}
