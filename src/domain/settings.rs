//! Resolved runtime settings, built from a validated [`ConfigPort`].

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::breakout::BreakoutRules;
use crate::domain::config_validation::validate_config;
use crate::domain::error::MonitorError;
use crate::domain::indicator::IndicatorParams;
use crate::domain::portfolio::Portfolio;
use crate::domain::position::{parse_position_line, Position};
use crate::domain::sector::{default_sectors, parse_sector, SectorProxy};
use crate::domain::watchlist::default_watchlist;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub provider: ProviderKind,
    pub csv_dir: PathBuf,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            csv_dir: PathBuf::from("data"),
            timeout: Duration::from_secs(10),
            max_retries: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub initial_cash: f64,
    pub chart_path: String,
    pub equity_days: u64,
    pub sectors: Vec<SectorProxy>,
    pub sector_lookback_days: u64,
    pub top_sectors: usize,
    pub watchlist: Vec<String>,
    pub rules: BreakoutRules,
    pub portfolio: Portfolio,
    pub data: DataSettings,
}

pub fn default_portfolio() -> Portfolio {
    Portfolio::new(vec![
        Position {
            symbol: "KLAC".into(),
            entry_price: 85.5,
            shares: 3.508,
            stop_price: 79.9,
        },
        Position {
            symbol: "ENPH".into(),
            entry_price: 151.0,
            shares: 1.656,
            stop_price: 140.4,
        },
        Position {
            symbol: "SOFI".into(),
            entry_price: 10.2,
            shares: 13.725,
            stop_price: 9.5,
        },
    ])
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            initial_cash: 690.0,
            chart_path: "equity_curve.svg".to_string(),
            equity_days: 30,
            sectors: default_sectors(),
            sector_lookback_days: 91,
            top_sectors: 3,
            watchlist: default_watchlist(),
            rules: BreakoutRules::default(),
            portfolio: default_portfolio(),
            data: DataSettings::default(),
        }
    }
}

fn positive(config: &dyn ConfigPort, section: &str, key: &str, default: u64) -> u64 {
    u64::try_from(config.get_int(section, key, default as i64)).unwrap_or(default)
}

impl MonitorSettings {
    /// Validate `config` and overlay its values on the defaults.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, MonitorError> {
        validate_config(config)?;
        let d = MonitorSettings::default();

        let sectors = match config.get_list("monitor", "sectors", ',') {
            Some(entries) => entries
                .iter()
                .map(|e| parse_sector(e))
                .collect::<Result<Vec<_>, _>>()?,
            None => d.sectors,
        };

        let watchlist = config
            .get_list("monitor", "watchlist", ',')
            .map(|v| v.into_iter().map(|s| s.to_uppercase()).collect())
            .unwrap_or(d.watchlist);

        let portfolio = match config.get_list("portfolio", "positions", '|') {
            Some(lines) => Portfolio::new(
                lines
                    .iter()
                    .map(|l| parse_position_line(l))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => d.portfolio,
        };

        let rules = BreakoutRules {
            indicators: IndicatorParams {
                high_window: positive(config, "breakout", "high_window", 50) as usize,
                volume_window: positive(config, "breakout", "volume_window", 30) as usize,
                rsi_period: positive(config, "breakout", "rsi_period", 14) as usize,
            },
            volume_ratio_min: config.get_double("breakout", "volume_ratio_min", 1.3),
            rsi_max: config.get_double("breakout", "rsi_max", 65.0),
            lookback_days: positive(config, "breakout", "lookback_days", 100),
        };

        let provider = match config.get_string("data", "provider") {
            Some(p) if p.trim().eq_ignore_ascii_case("csv") => ProviderKind::Csv,
            _ => ProviderKind::Yahoo,
        };

        let data = DataSettings {
            provider,
            csv_dir: config
                .get_string("data", "csv_dir")
                .map(PathBuf::from)
                .unwrap_or(d.data.csv_dir),
            timeout: Duration::from_secs(positive(config, "data", "timeout_secs", 10)),
            max_retries: positive(config, "data", "max_retries", 1) as u32,
        };

        Ok(MonitorSettings {
            interval: Duration::from_secs(positive(config, "monitor", "interval_secs", 3600)),
            initial_cash: config.get_double("monitor", "initial_cash", d.initial_cash),
            chart_path: config
                .get_string("monitor", "chart_path")
                .map(|p| p.trim().to_string())
                .unwrap_or(d.chart_path),
            equity_days: positive(config, "monitor", "equity_days", 30),
            sectors,
            sector_lookback_days: positive(config, "monitor", "sector_lookback_days", 91),
            top_sectors: positive(config, "monitor", "top_sectors", 3) as usize,
            watchlist,
            rules,
            portfolio,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use approx::assert_relative_eq;

    #[test]
    fn empty_config_gives_defaults() {
        let adapter = FileConfigAdapter::from_string("").unwrap();
        let settings = MonitorSettings::from_config(&adapter).unwrap();
        assert_eq!(settings, MonitorSettings::default());
        assert_eq!(settings.interval, Duration::from_secs(3600));
        assert_eq!(settings.portfolio.position_count(), 3);
        assert_eq!(settings.sectors.len(), 6);
    }

    #[test]
    fn overrides_are_applied() {
        let ini = r#"
[monitor]
interval_secs = 120
initial_cash = 1000
chart_path = charts/equity.svg
sectors = Gold:GLD, REIT:VNQ
watchlist = amd, pltr
top_sectors = 2

[breakout]
high_window = 20
volume_ratio_min = 1.5
rsi_max = 70

[portfolio]
positions = AMD,120,2,110

[data]
provider = CSV
csv_dir = /tmp/bars
timeout_secs = 3
max_retries = 0
"#;
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let s = MonitorSettings::from_config(&adapter).unwrap();

        assert_eq!(s.interval, Duration::from_secs(120));
        assert_relative_eq!(s.initial_cash, 1000.0);
        assert_eq!(s.chart_path, "charts/equity.svg");
        assert_eq!(
            s.sectors,
            vec![SectorProxy::new("Gold", "GLD"), SectorProxy::new("REIT", "VNQ")]
        );
        assert_eq!(s.watchlist, vec!["AMD", "PLTR"]);
        assert_eq!(s.top_sectors, 2);
        assert_eq!(s.rules.indicators.high_window, 20);
        assert_eq!(s.rules.indicators.volume_window, 30);
        assert_relative_eq!(s.rules.volume_ratio_min, 1.5);
        assert_relative_eq!(s.rules.rsi_max, 70.0);
        assert_eq!(s.portfolio.position_count(), 1);
        assert!(s.portfolio.has_position("AMD"));
        assert_eq!(s.data.provider, ProviderKind::Csv);
        assert_eq!(s.data.csv_dir, PathBuf::from("/tmp/bars"));
        assert_eq!(s.data.timeout, Duration::from_secs(3));
        assert_eq!(s.data.max_retries, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let adapter = FileConfigAdapter::from_string("[breakout]\nrsi_max = 0\n").unwrap();
        assert!(matches!(
            MonitorSettings::from_config(&adapter),
            Err(MonitorError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn empty_positions_value_gives_empty_portfolio() {
        let adapter = FileConfigAdapter::from_string("[portfolio]\npositions =\n").unwrap();
        let s = MonitorSettings::from_config(&adapter).unwrap();
        assert!(s.portfolio.is_empty());
    }
}
