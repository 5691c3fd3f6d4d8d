//! Yahoo Finance market-data adapter.
//!
//! Fetches daily bars from the v8 chart API. Every request is bounded by the
//! client timeout and retried with exponential backoff up to `max_retries`
//! times; exhaustion surfaces as [`MonitorError::DataUnavailable`].

use crate::domain::error::MonitorError;
use crate::domain::ohlcv::{normalize, OhlcvBar};
use crate::domain::settings::DataSettings;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooAdapter {
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, MonitorError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout, max_retries)
    }

    /// Same as [`YahooAdapter::new`] against another chart API host.
    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, MonitorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| MonitorError::unavailable("yahoo", format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn from_settings(settings: &DataSettings) -> Result<Self, MonitorError> {
        Self::new(settings.timeout, settings.max_retries)
    }

    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(start_ts);
        format!(
            "{}/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true",
            self.base_url
        )
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<OhlcvBar>, MonitorError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) => {
                MonitorError::unavailable(symbol, format!("{}: {}", err.code, err.description))
            }
            None => MonitorError::unavailable(symbol, "empty result with no error"),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| MonitorError::unavailable(symbol, "result array is empty"))?;

        // A range with no sessions comes back without timestamps.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| MonitorError::unavailable(symbol, "no quote data"))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| MonitorError::unavailable(symbol, format!("invalid timestamp: {ts}")))?;

            // Sessions without a close (holidays, partial rows) are dropped.
            let Some(close) = quote.close.get(i).copied().flatten().filter(|c| c.is_finite())
            else {
                debug!("{symbol}: no close on {date}, session skipped");
                continue;
            };
            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open: open.unwrap_or(close),
                high: high.unwrap_or(close),
                low: low.unwrap_or(close),
                close,
                volume: volume.map_or(0, |v| i64::try_from(v).unwrap_or(i64::MAX)),
            });
        }

        Ok(normalize(bars))
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, MonitorError> {
        let url = self.chart_url(symbol, start, end);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self
                    .base_delay
                    .saturating_mul(2u32.saturating_pow(attempt - 1));
                debug!("{symbol}: retry {attempt} after {delay:?}");
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(MonitorError::unavailable(symbol, "symbol not found"));
                    }
                    if !status.is_success() {
                        last_error = Some(MonitorError::unavailable(symbol, format!("HTTP {status}")));
                        continue;
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        MonitorError::unavailable(symbol, format!("failed to parse response: {e}"))
                    })?;
                    return Self::parse_response(symbol, chart);
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(MonitorError::unavailable(symbol, e.to_string()));
                }
                Err(e) => return Err(MonitorError::unavailable(symbol, e.to_string())),
            }
        }

        Err(last_error.unwrap_or_else(|| MonitorError::unavailable(symbol, "max retries exceeded")))
    }
}

impl MarketDataPort for YahooAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, MonitorError> {
        let bars = self.fetch_with_retry(symbol, start, end)?;
        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect())
    }
}
