//! Configuration validation.
//!
//! Validates every present field before settings are built. Absent keys are
//! fine: they fall back to defaults.

use crate::domain::error::MonitorError;
use crate::domain::position::parse_position_line;
use crate::domain::sector::parse_sector;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), MonitorError> {
    validate_monitor(config)?;
    validate_breakout(config)?;
    validate_portfolio(config)?;
    validate_data(config)?;
    Ok(())
}

/// A present key must parse as a number satisfying `ok`.
fn check_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    ok: impl Fn(f64) -> bool,
    reason: &str,
) -> Result<(), MonitorError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && ok(v) => Ok(()),
        Ok(_) => Err(MonitorError::invalid(section, key, reason)),
        Err(_) => Err(MonitorError::invalid(
            section,
            key,
            format!("'{}' is not a number", raw.trim()),
        )),
    }
}

/// Upper bound on `[data] max_retries`; backoff doubles per attempt.
pub const MAX_FETCH_RETRIES: i64 = 5;

fn check_whole(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    min: i64,
) -> Result<(), MonitorError> {
    check_whole_between(config, section, key, min, i64::MAX)
}

fn check_whole_between(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
) -> Result<(), MonitorError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if (min..=max).contains(&v) => Ok(()),
        Ok(v) if v < min => Err(MonitorError::invalid(
            section,
            key,
            format!("{key} must be at least {min}"),
        )),
        Ok(_) => Err(MonitorError::invalid(
            section,
            key,
            format!("{key} must be at most {max}"),
        )),
        Err(_) => Err(MonitorError::invalid(
            section,
            key,
            format!("'{}' is not a whole number", raw.trim()),
        )),
    }
}

fn validate_monitor(config: &dyn ConfigPort) -> Result<(), MonitorError> {
    check_whole(config, "monitor", "interval_secs", 1)?;
    check_number(
        config,
        "monitor",
        "initial_cash",
        |v| v >= 0.0,
        "initial_cash must be non-negative",
    )?;
    check_whole(config, "monitor", "equity_days", 1)?;
    check_whole(config, "monitor", "sector_lookback_days", 2)?;
    check_whole(config, "monitor", "top_sectors", 1)?;

    if let Some(path) = config.get_string("monitor", "chart_path") {
        if path.trim().is_empty() {
            return Err(MonitorError::invalid(
                "monitor",
                "chart_path",
                "chart_path must not be empty",
            ));
        }
    }

    if let Some(entries) = config.get_list("monitor", "sectors", ',') {
        if entries.is_empty() {
            return Err(MonitorError::invalid(
                "monitor",
                "sectors",
                "at least one sector is required",
            ));
        }
        for entry in &entries {
            parse_sector(entry)
                .map_err(|e| MonitorError::invalid("monitor", "sectors", e.to_string()))?;
        }
    }
    Ok(())
}

fn validate_breakout(config: &dyn ConfigPort) -> Result<(), MonitorError> {
    check_whole(config, "breakout", "high_window", 1)?;
    check_whole(config, "breakout", "volume_window", 1)?;
    check_whole(config, "breakout", "rsi_period", 1)?;
    check_whole(config, "breakout", "lookback_days", 1)?;
    check_number(
        config,
        "breakout",
        "volume_ratio_min",
        |v| v >= 0.0,
        "volume_ratio_min must be non-negative",
    )?;
    check_number(
        config,
        "breakout",
        "rsi_max",
        |v| v > 0.0 && v <= 100.0,
        "rsi_max must be in (0, 100]",
    )?;
    Ok(())
}

fn validate_portfolio(config: &dyn ConfigPort) -> Result<(), MonitorError> {
    if let Some(lines) = config.get_list("portfolio", "positions", '|') {
        for line in &lines {
            parse_position_line(line)
                .map_err(|e| MonitorError::invalid("portfolio", "positions", e.to_string()))?;
        }
    }
    Ok(())
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), MonitorError> {
    if let Some(provider) = config.get_string("data", "provider") {
        match provider.trim().to_lowercase().as_str() {
            "yahoo" | "csv" => {}
            other => {
                return Err(MonitorError::invalid(
                    "data",
                    "provider",
                    format!("unknown provider '{other}' (expected yahoo or csv)"),
                ));
            }
        }
    }
    check_whole(config, "data", "timeout_secs", 1)?;
    check_whole_between(config, "data", "max_retries", 0, MAX_FETCH_RETRIES)?;
    Ok(())
}
