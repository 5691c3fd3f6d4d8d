//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::console::Console;
use crate::domain::cycle::{local_today, Monitor};
use crate::domain::error::MonitorError;
use crate::domain::portfolio::PortfolioStore;
use crate::domain::settings::{DataSettings, MonitorSettings, ProviderKind};
use crate::ports::data_port::MarketDataPort;
use crate::scheduler::Scheduler;

#[derive(Parser, Debug)]
#[command(
    name = "momentum-watch",
    about = "Momentum, breakout and stop-loss monitor"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the scheduler with the interactive console
    Watch {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a single monitoring cycle and print the report
    Cycle {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Scan the watchlist for breakouts
    Scan {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration and print the resolved settings
    Validate {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Watch { config } => run_watch(config.as_ref()),
        Command::Cycle { config } => run_cycle(config.as_ref()),
        Command::Scan { config } => run_scan(config.as_ref()),
        Command::Validate { config } => run_validate(config.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = MonitorError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Defaults when no file is given; otherwise the validated file contents.
pub fn load_settings(path: Option<&PathBuf>) -> Result<MonitorSettings, ExitCode> {
    let Some(path) = path else {
        return Ok(MonitorSettings::default());
    };
    eprintln!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    MonitorSettings::from_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

pub fn build_data_port(data: &DataSettings) -> Result<Arc<dyn MarketDataPort>, MonitorError> {
    match data.provider {
        ProviderKind::Csv => Ok(Arc::new(CsvAdapter::new(data.csv_dir.clone()))),
        #[cfg(feature = "yahoo")]
        ProviderKind::Yahoo => Ok(Arc::new(
            crate::adapters::yahoo_adapter::YahooAdapter::from_settings(data)?,
        )),
        #[cfg(not(feature = "yahoo"))]
        ProviderKind::Yahoo => Err(MonitorError::invalid(
            "data",
            "provider",
            "built without yahoo support; use provider = csv",
        )),
    }
}

pub fn build_monitor(settings: MonitorSettings) -> Result<Monitor, MonitorError> {
    let data = build_data_port(&settings.data)?;
    Ok(Monitor::new(
        data,
        Arc::new(SvgChartAdapter::new()),
        Arc::new(TextReportAdapter::stdout()),
        settings,
    ))
}

fn prepare(config_path: Option<&PathBuf>) -> Result<(Monitor, PortfolioStore), ExitCode> {
    let settings = load_settings(config_path)?;
    let store = PortfolioStore::new(settings.portfolio.clone());
    let monitor = build_monitor(settings).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok((monitor, store))
}

fn run_watch(config_path: Option<&PathBuf>) -> ExitCode {
    let (monitor, store) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let interval = monitor.settings().interval;
    let monitor = Arc::new(monitor);

    let scheduler = match Scheduler::spawn(Arc::clone(&monitor), store.clone(), interval) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let console = Console::new(&monitor, &store, &scheduler);
    let result = console.run(std::io::stdin().lock(), std::io::stdout());
    info!("operator exit, stopping scheduler");
    scheduler.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_cycle(config_path: Option<&PathBuf>) -> ExitCode {
    let (monitor, store) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    monitor.run_and_report(&store, local_today());
    ExitCode::SUCCESS
}

fn run_scan(config_path: Option<&PathBuf>) -> ExitCode {
    let (monitor, store) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    monitor.scan_and_report(&store, local_today());
    ExitCode::SUCCESS
}

/// Human-readable summary of resolved settings.
pub fn describe_settings(s: &MonitorSettings) -> String {
    let sectors: Vec<String> = s
        .sectors
        .iter()
        .map(|p| format!("{} ({})", p.name, p.symbol))
        .collect();
    let positions: Vec<String> = s
        .portfolio
        .positions()
        .iter()
        .map(|p| {
            format!(
                "{} entry {:.2} x {} stop {:.2}",
                p.symbol, p.entry_price, p.shares, p.stop_price
            )
        })
        .collect();
    let provider = match s.data.provider {
        ProviderKind::Yahoo => "yahoo".to_string(),
        ProviderKind::Csv => format!("csv ({})", s.data.csv_dir.display()),
    };

    let mut lines = vec![
        format!("  Interval:      {}s", s.interval.as_secs()),
        format!("  Initial cash:  {:.2}", s.initial_cash),
        format!("  Chart:         {} ({} days)", s.chart_path, s.equity_days),
        format!(
            "  Sectors:       top {} of {} over {} days",
            s.top_sectors,
            sectors.join(", "),
            s.sector_lookback_days
        ),
        format!("  Watchlist:     {}", s.watchlist.join(", ")),
        format!(
            "  Breakout:      high {}d, volume {}d, RSI {} (ratio > {}, RSI < {})",
            s.rules.indicators.high_window,
            s.rules.indicators.volume_window,
            s.rules.indicators.rsi_period,
            s.rules.volume_ratio_min,
            s.rules.rsi_max
        ),
        format!(
            "  Data:          {provider}, timeout {}s, {} retries",
            s.data.timeout.as_secs(),
            s.data.max_retries
        ),
        format!("  Positions:     {}", s.portfolio.position_count()),
    ];
    lines.extend(positions.into_iter().map(|p| format!("    {p}")));
    lines.join("\n")
}

fn run_validate(config_path: Option<&PathBuf>) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    eprintln!("{}", describe_settings(&settings));
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
