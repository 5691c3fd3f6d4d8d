//! Equity-curve rendering port.

use crate::domain::error::MonitorError;
use crate::domain::portfolio::EquityPoint;

pub trait ChartPort: Send + Sync {
    /// Write a chart of `points` to `output_path`, replacing any previous one.
    fn render_equity(&self, points: &[EquityPoint], output_path: &str)
    -> Result<(), MonitorError>;
}
