//! Operator report sink port.

use crate::domain::cycle::CycleReport;
use crate::domain::error::MonitorError;
use crate::domain::watchlist::WatchlistScan;

/// Port for presenting cycle and watchlist results to the operator.
pub trait ReportPort: Send + Sync {
    fn write_cycle(&self, report: &CycleReport) -> Result<(), MonitorError>;

    fn write_watchlist(&self, scan: &WatchlistScan) -> Result<(), MonitorError>;

    /// Free-form operator feedback (console acknowledgements, parse errors).
    fn notice(&self, message: &str) -> Result<(), MonitorError>;
}
