//! Interactive operator console.
//!
//! Reads menu choices line by line: `1` refresh now, `2` scan the watchlist,
//! `3` replace the portfolio, `4` exit. End of input behaves like `done` while
//! entering positions and like `4` at the menu.

use std::io::{BufRead, Write};

use chrono::NaiveDate;
use log::warn;

use crate::domain::cycle::{local_today, Monitor};
use crate::domain::error::MonitorError;
use crate::domain::portfolio::{Portfolio, PortfolioStore};
use crate::domain::position::parse_position_line;
use crate::scheduler::RefreshTrigger;

const MENU: &str = "\n1) refresh now  2) scan watchlist  3) replace portfolio  4) exit\n> ";

pub struct Console<'a> {
    monitor: &'a Monitor,
    store: &'a PortfolioStore,
    trigger: &'a dyn RefreshTrigger,
    today: fn() -> NaiveDate,
}

impl<'a> Console<'a> {
    pub fn new(
        monitor: &'a Monitor,
        store: &'a PortfolioStore,
        trigger: &'a dyn RefreshTrigger,
    ) -> Self {
        Self {
            monitor,
            store,
            trigger,
            today: local_today,
        }
    }

    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Serve the menu until `4` or end of input.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<(), MonitorError> {
        loop {
            output.write_all(MENU.as_bytes())?;
            output.flush()?;

            let Some(line) = read_line(&mut input)? else {
                return Ok(());
            };

            match line.trim() {
                "1" => {
                    if self.trigger.request_refresh() {
                        self.notify("refresh requested");
                    } else {
                        writeln!(output, "scheduler is not running")?;
                    }
                }
                "2" => {
                    self.monitor.scan_and_report(self.store, (self.today)());
                }
                "3" => self.replace_portfolio(&mut input, &mut output)?,
                "4" => return Ok(()),
                _ => writeln!(output, "invalid choice")?,
            }
        }
    }

    fn replace_portfolio<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), MonitorError> {
        writeln!(
            output,
            "enter positions as SYMBOL,entry,shares,stop; 'done' to finish"
        )?;

        let mut positions = Vec::new();
        while let Some(line) = read_line(input)? {
            let line = line.trim();
            if line.eq_ignore_ascii_case("done") {
                break;
            }
            if line.is_empty() {
                continue;
            }
            match parse_position_line(line) {
                Ok(position) => positions.push(position),
                Err(e) => writeln!(output, "skipped: {e}")?,
            }
        }

        let portfolio = Portfolio::new(positions);
        let count = portfolio.position_count();
        self.store.replace(portfolio);
        self.notify(&format!("portfolio replaced: {count} positions"));
        Ok(())
    }

    fn notify(&self, message: &str) {
        if let Err(e) = self.monitor.report_port().notice(message) {
            warn!("console notice not written: {e}");
        }
    }
}

/// `None` at end of input. Bytes that are not UTF-8 become U+FFFD, so a
/// garbled line is rejected by the parser instead of ending the session.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, MonitorError> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
