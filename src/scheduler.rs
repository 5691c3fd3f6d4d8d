//! Background scheduler thread.
//!
//! Runs one cycle immediately, then one per interval. Ad-hoc refresh requests
//! arrive over the same channel, so two cycles never run at once.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::domain::cycle::{local_today, Monitor};
use crate::domain::error::MonitorError;
use crate::domain::portfolio::PortfolioStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    RunNow,
    Shutdown,
}

/// Something that can be asked to run a cycle as soon as possible.
pub trait RefreshTrigger {
    /// `false` when the request could not be delivered.
    fn request_refresh(&self) -> bool;
}

pub struct Scheduler {
    tx: Sender<SchedulerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn spawn(
        monitor: Arc<Monitor>,
        store: PortfolioStore,
        interval: Duration,
    ) -> Result<Self, MonitorError> {
        Self::spawn_with_clock(monitor, store, interval, local_today)
    }

    /// Like [`Scheduler::spawn`], with the evaluation date supplied by `today`.
    pub fn spawn_with_clock(
        monitor: Arc<Monitor>,
        store: PortfolioStore,
        interval: Duration,
        today: fn() -> NaiveDate,
    ) -> Result<Self, MonitorError> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("momentum-scheduler".into())
            .spawn(move || scheduler_loop(&monitor, &store, interval, today, rx))?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Stop after the cycle in progress (if any) and wait for the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.tx.send(SchedulerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("scheduler thread panicked");
            }
        }
    }
}

impl RefreshTrigger for Scheduler {
    fn request_refresh(&self) -> bool {
        self.tx.send(SchedulerCommand::RunNow).is_ok()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn scheduler_loop(
    monitor: &Monitor,
    store: &PortfolioStore,
    interval: Duration,
    today: fn() -> NaiveDate,
    rx: Receiver<SchedulerCommand>,
) {
    info!("scheduler started, interval {}s", interval.as_secs());
    monitor.run_and_report(store, today());

    loop {
        match rx.recv_timeout(interval) {
            Ok(SchedulerCommand::RunNow) => {
                debug!("refresh requested");
                monitor.run_and_report(store, today());
            }
            Err(RecvTimeoutError::Timeout) => {
                monitor.run_and_report(store, today());
            }
            Ok(SchedulerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    info!("scheduler stopped");
}
