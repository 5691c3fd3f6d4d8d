//! Sector momentum ranking from proxy instruments.

use chrono::NaiveDate;
use log::warn;

use crate::domain::breakout::SkipReason;
use crate::domain::error::MonitorError;
use crate::domain::ohlcv::{percent_return, round2};
use crate::ports::data_port::MarketDataPort;

/// A single tradable instrument standing in for a whole sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorProxy {
    pub name: String,
    pub symbol: String,
}

impl SectorProxy {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

pub fn default_sectors() -> Vec<SectorProxy> {
    vec![
        SectorProxy::new("Semiconductor", "SOXX"),
        SectorProxy::new("Clean Energy", "ICLN"),
        SectorProxy::new("Fintech", "FINX"),
        SectorProxy::new("Biotech", "IBB"),
        SectorProxy::new("REIT", "VNQ"),
        SectorProxy::new("Gold", "GLD"),
    ]
}

/// Parse `Name:SYMBOL` into a proxy.
pub fn parse_sector(entry: &str) -> Result<SectorProxy, MonitorError> {
    let malformed = |reason: &str| MonitorError::MalformedInput {
        input: entry.to_string(),
        reason: reason.to_string(),
    };
    let (name, symbol) = entry
        .split_once(':')
        .ok_or_else(|| malformed("expected Name:SYMBOL"))?;
    let (name, symbol) = (name.trim(), symbol.trim());
    if name.is_empty() || symbol.is_empty() {
        return Err(malformed("empty sector name or symbol"));
    }
    Ok(SectorProxy::new(name, &symbol.to_uppercase()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorScore {
    pub sector_name: String,
    pub percent_return: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedSector {
    pub sector_name: String,
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorRanking {
    /// Best sectors, highest return first.
    pub top: Vec<SectorScore>,
    /// Sectors left out because their proxy had no usable data.
    pub excluded: Vec<ExcludedSector>,
}

/// Top `top_n` scores by descending return. The sort is stable, so ties keep
/// their enumeration order.
pub fn rank_scores(mut scores: Vec<SectorScore>, top_n: usize) -> Vec<SectorScore> {
    scores.sort_by(|a, b| b.percent_return.total_cmp(&a.percent_return));
    scores.truncate(top_n);
    scores
}

/// Fetch each proxy over `lookback_days` and rank by trailing return.
pub fn rank_sectors(
    data_port: &dyn MarketDataPort,
    sectors: &[SectorProxy],
    lookback_days: u64,
    top_n: usize,
    as_of: NaiveDate,
) -> SectorRanking {
    let mut scores = Vec::with_capacity(sectors.len());
    let mut excluded = Vec::new();

    for sector in sectors {
        let outcome = data_port
            .fetch_trailing(&sector.symbol, lookback_days, as_of)
            .and_then(|bars| {
                percent_return(&bars).ok_or_else(|| {
                    MonitorError::unavailable(&sector.symbol, "no usable closes in lookback")
                })
            });

        match outcome {
            Ok(ret) => scores.push(SectorScore {
                sector_name: sector.name.clone(),
                percent_return: round2(ret),
            }),
            Err(e) => {
                warn!("sector {} excluded from ranking: {e}", sector.name);
                excluded.push(ExcludedSector {
                    sector_name: sector.name.clone(),
                    symbol: sector.symbol.clone(),
                    reason: e.into(),
                });
            }
        }
    }

    SectorRanking {
        top: rank_scores(scores, top_n),
        excluded,
    }
}
