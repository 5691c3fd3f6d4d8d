//! Plain-text operator report, written to any `Write` sink (stdout by default).

use std::fmt::Write as _;
use std::io::Write;
use std::sync::Mutex;

use crate::domain::breakout::{BreakoutDetail, BreakoutResult, Confirmation};
use crate::domain::cycle::{CycleReport, EquityOutcome, PositionBreakout};
use crate::domain::error::MonitorError;
use crate::domain::stop_loss::StopLossStatus;
use crate::domain::watchlist::WatchlistScan;
use crate::ports::report_port::ReportPort;

fn breakout_line(out: &mut String, result: &BreakoutResult, label: Option<&str>) {
    match &result.detail {
        BreakoutDetail::Measured(m) => {
            let verdict = if result.is_breakout {
                "BREAKOUT"
            } else {
                "no breakout"
            };
            let _ = write!(
                out,
                "  {:<6} {verdict}: price {:.2}, 50d high {:.2}, volume ratio {:.2}, RSI {:.1}",
                result.symbol, m.current_price, m.rolling_high, m.volume_ratio, m.rsi
            );
            if let Some(label) = label {
                let _ = write!(out, " ({label})");
            }
            out.push('\n');
        }
        BreakoutDetail::Unavailable(reason) => {
            let _ = writeln!(out, "  {:<6} unavailable: {reason}", result.symbol);
        }
    }
}

fn position_breakout_line(out: &mut String, entry: &PositionBreakout) {
    let label = entry.confirmation().map(|c| match c {
        Confirmation::Confirmed => "confirmed, above entry",
        Confirmation::Pending => "pending confirmation",
    });
    breakout_line(out, &entry.result, label);
}

fn stop_line(out: &mut String, status: &StopLossStatus) {
    match status {
        StopLossStatus::Evaluated(v) if v.triggered => {
            let _ = writeln!(
                out,
                "  {:<6} STOP-LOSS TRIGGERED at {:.2} (stop {:.2}), loss {:.2}%",
                v.symbol, v.current_price, v.stop_price, v.percent_change
            );
        }
        StopLossStatus::Evaluated(v) => {
            let _ = writeln!(
                out,
                "  {:<6} holding at {:.2} (stop {:.2}), unrealized P/L {:+.2}%",
                v.symbol, v.current_price, v.stop_price, v.percent_change
            );
        }
        StopLossStatus::Unavailable { symbol, reason } => {
            let _ = writeln!(out, "  {symbol:<6} price unavailable: {reason}");
        }
    }
}

pub fn format_cycle(report: &CycleReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Monitoring cycle {} (data as of {}) ===",
        report.generated_at.format("%Y-%m-%d %H:%M:%S"),
        report.as_of
    );

    out.push_str("\nTop sectors (3-month return):\n");
    if report.sectors.top.is_empty() {
        out.push_str("  no sector data available\n");
    }
    for (rank, score) in report.sectors.top.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<16} {:+.2}%",
            rank + 1,
            score.sector_name,
            score.percent_return
        );
    }
    for excluded in &report.sectors.excluded {
        let _ = writeln!(
            out,
            "  excluded: {} ({}): {}",
            excluded.sector_name, excluded.symbol, excluded.reason
        );
    }

    let _ = writeln!(out, "\nPositions held: {}", report.position_count);
    if report.position_count == 0 {
        out.push_str("  no positions\n");
    } else {
        out.push_str("\nBreakouts:\n");
        for entry in &report.breakouts {
            position_breakout_line(&mut out, entry);
        }
        out.push_str("\nStop-loss:\n");
        for status in &report.stops {
            stop_line(&mut out, status);
        }
    }

    out.push_str("\nEquity curve: ");
    match &report.equity {
        EquityOutcome::Rendered { path, points } => {
            let _ = writeln!(out, "{points} points written to {path}");
        }
        EquityOutcome::Failed { reason } => {
            let _ = writeln!(out, "not rendered ({reason})");
        }
    }
    out
}

pub fn format_watchlist(scan: &WatchlistScan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Watchlist scan ({} candidates) ===", scan.scanned);
    if scan.has_hits() {
        for hit in &scan.hits {
            breakout_line(&mut out, hit, None);
        }
    } else {
        out.push_str("  no watchlist breakouts\n");
    }
    if !scan.unavailable.is_empty() {
        let _ = writeln!(out, "  unavailable: {}", scan.unavailable.join(", "));
    }
    out
}

pub struct TextReportAdapter {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl TextReportAdapter {
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn emit(&self, text: &str) -> Result<(), MonitorError> {
        let mut sink = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sink.write_all(text.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}

impl ReportPort for TextReportAdapter {
    fn write_cycle(&self, report: &CycleReport) -> Result<(), MonitorError> {
        self.emit(&format_cycle(report))
    }

    fn write_watchlist(&self, scan: &WatchlistScan) -> Result<(), MonitorError> {
        self.emit(&format_watchlist(scan))
    }

    fn notice(&self, message: &str) -> Result<(), MonitorError> {
        self.emit(&format!("{message}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::breakout::{BreakoutMeasurements, SkipReason};
    use crate::domain::sector::{ExcludedSector, SectorRanking, SectorScore};
    use crate::domain::stop_loss::StopLossVerdict;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn measured(symbol: &str, is_breakout: bool, price: f64) -> BreakoutResult {
        BreakoutResult {
            symbol: symbol.into(),
            is_breakout,
            detail: BreakoutDetail::Measured(BreakoutMeasurements {
                current_price: price,
                rolling_high: 100.0,
                volume_ratio: 1.5,
                rsi: 55.0,
            }),
        }
    }

    fn report() -> CycleReport {
        CycleReport {
            generated_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            as_of: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            sectors: SectorRanking {
                top: vec![SectorScore {
                    sector_name: "Semiconductor".into(),
                    percent_return: 12.5,
                }],
                excluded: vec![ExcludedSector {
                    sector_name: "Fintech".into(),
                    symbol: "FINX".into(),
                    reason: SkipReason::NoData {
                        reason: "HTTP 500".into(),
                    },
                }],
            },
            breakouts: vec![
                PositionBreakout {
                    result: measured("KLAC", true, 101.0),
                    entry_price: 85.5,
                },
                PositionBreakout {
                    result: measured("ENPH", true, 101.0),
                    entry_price: 151.0,
                },
                PositionBreakout {
                    result: BreakoutResult::unavailable(
                        "SOFI",
                        SkipReason::InsufficientBars {
                            bars: 20,
                            minimum: 50,
                        },
                    ),
                    entry_price: 10.2,
                },
            ],
            stops: vec![
                StopLossStatus::Evaluated(StopLossVerdict {
                    symbol: "KLAC".into(),
                    current_price: 93.0,
                    stop_price: 93.0,
                    triggered: true,
                    percent_change: -7.0,
                }),
                StopLossStatus::Evaluated(StopLossVerdict {
                    symbol: "ENPH".into(),
                    current_price: 160.0,
                    stop_price: 140.4,
                    triggered: false,
                    percent_change: 5.96,
                }),
                StopLossStatus::Unavailable {
                    symbol: "SOFI".into(),
                    reason: SkipReason::NoData {
                        reason: "timeout".into(),
                    },
                },
            ],
            position_count: 3,
            equity: EquityOutcome::Rendered {
                path: "equity_curve.svg".into(),
                points: 30,
            },
        }
    }

    #[test]
    fn cycle_report_sections() {
        let text = format_cycle(&report());
        assert!(text.contains("2024-03-01 09:30:00"));
        assert!(text.contains("1. Semiconductor"));
        assert!(text.contains("+12.50%"));
        assert!(text.contains("excluded: Fintech (FINX)"));
        assert!(text.contains("KLAC   BREAKOUT"));
        assert!(text.contains("(confirmed, above entry)"));
        assert!(text.contains("(pending confirmation)"));
        assert!(text.contains("SOFI   unavailable: insufficient history (20 of 50 bars)"));
        assert!(text.contains("STOP-LOSS TRIGGERED at 93.00 (stop 93.00), loss -7.00%"));
        assert!(text.contains("unrealized P/L +5.96%"));
        assert!(text.contains("SOFI   price unavailable: data unavailable (timeout)"));
        assert!(text.contains("30 points written to equity_curve.svg"));
    }

    #[test]
    fn empty_portfolio_report() {
        let mut r = report();
        r.breakouts.clear();
        r.stops.clear();
        r.position_count = 0;
        r.equity = EquityOutcome::Failed {
            reason: "disk full".into(),
        };
        let text = format_cycle(&r);
        assert!(text.contains("Positions held: 0"));
        assert!(text.contains("no positions"));
        assert!(!text.contains("Stop-loss:"));
        assert!(text.contains("not rendered (disk full)"));
    }

    #[test]
    fn watchlist_with_and_without_hits() {
        let empty = WatchlistScan {
            hits: vec![],
            scanned: 5,
            unavailable: vec!["RIVN".into()],
        };
        let text = format_watchlist(&empty);
        assert!(text.contains("5 candidates"));
        assert!(text.contains("no watchlist breakouts"));
        assert!(text.contains("unavailable: RIVN"));

        let hits = WatchlistScan {
            hits: vec![measured("PLTR", true, 101.0)],
            scanned: 5,
            unavailable: vec![],
        };
        let text = format_watchlist(&hits);
        assert!(text.contains("PLTR   BREAKOUT: price 101.00"));
        assert!(!text.contains("no watchlist breakouts"));
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn adapter_writes_to_sink() {
        let buf = SharedBuf::default();
        let adapter = TextReportAdapter::new(Box::new(buf.clone()));
        adapter.notice("portfolio replaced").unwrap();
        adapter.write_watchlist(&WatchlistScan::default()).unwrap();

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(text.starts_with("portfolio replaced\n"));
        assert!(text.contains("no watchlist breakouts"));
    }
}
