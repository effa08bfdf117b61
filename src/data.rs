//! Market data acquisition and cleaning
//!
//! Sources return raw daily rows for a ticker and date range. A source never
//! surfaces transport problems to the caller: anything that goes wrong is
//! logged and comes back as an empty result. [`normalize`] turns raw rows into
//! a clean, strictly ascending bar series.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::{DateRange, PriceBar, RawBar, Ticker};

// =============================================================================
// Constants
// =============================================================================

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DAILY_INTERVAL: &str = "1d";

// =============================================================================
// Source abstraction
// =============================================================================

/// Provider of daily OHLC rows
pub trait MarketDataSource {
    /// Rows for `ticker` dated in `range`. Empty on any failure.
    fn fetch(&self, ticker: &Ticker, range: DateRange) -> Vec<RawBar>;

    /// Short name for logs
    fn name(&self) -> &str;
}

// =============================================================================
// Yahoo Finance chart API
// =============================================================================

/// Blocking client for the Yahoo Finance v8 chart endpoint
pub struct YahooDataFetcher {
    client: reqwest::blocking::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooDataFetcher {
    /// Create a fetcher from provider settings
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid provider URL: {}", config.base_url))?;

        Ok(Self { client, base_url })
    }

    /// Chart URL for a ticker. `end` is exclusive.
    pub fn chart_url(&self, ticker: &Ticker, range: DateRange) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Provider URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(&["v8", "finance", "chart", ticker.as_str()]);

        url.query_pairs_mut()
            .append_pair("period1", &midnight_timestamp(range.start).to_string())
            .append_pair("period2", &midnight_timestamp(range.end).to_string())
            .append_pair("interval", DAILY_INTERVAL)
            .append_pair("events", "history");

        Ok(url)
    }

    fn try_fetch(&self, ticker: &Ticker, range: DateRange) -> Result<Vec<RawBar>> {
        let url = self.chart_url(ticker, range)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .context("Failed to send request")?;

        // Yahoo answers unknown tickers with 404 and an error body
        let status = response.status();
        let body = response.text().context("Failed to read response body")?;
        if !status.is_success() {
            bail!("API returned status: {}", status);
        }

        parse_chart_response(&body)
    }
}

impl MarketDataSource for YahooDataFetcher {
    fn fetch(&self, ticker: &Ticker, range: DateRange) -> Vec<RawBar> {
        info!(
            "Fetching {} daily bars from {} to {}",
            ticker, range.start, range.end
        );

        match self.try_fetch(ticker, range) {
            Ok(rows) => {
                info!("Fetched {} rows for {}", rows.len(), ticker);
                rows
            }
            Err(e) => {
                warn!("No data for {}: {:#}", ticker, e);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Parse a v8 chart payload into raw rows, keeping missing prices as `None`
pub fn parse_chart_response(body: &str) -> Result<Vec<RawBar>> {
    let response: ChartResponse =
        serde_json::from_str(body).context("Failed to parse chart response")?;

    if let Some(error) = response.chart.error.filter(|e| !e.is_null()) {
        bail!("chart API error: {}", error);
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        // Exchange-local calendar date
        let Some(datetime) = DateTime::from_timestamp(ts + offset, 0) else {
            debug!("Skipping out-of-range timestamp {}", ts);
            continue;
        };
        rows.push(RawBar {
            date: datetime.date_naive(),
            open: value_at(&quote.open, i),
            high: value_at(&quote.high, i),
            low: value_at(&quote.low, i),
            close: value_at(&quote.close, i),
        });
    }

    Ok(rows)
}

fn value_at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

// =============================================================================
// CSV source
// =============================================================================

/// Offline source reading `date,open,high,low,close` rows from a CSV file.
///
/// Header names are accepted in lower or title case (`close` or `Close`) and
/// extra columns (volume, adjusted close) are ignored.
pub struct CsvDataSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "datetime", alias = "Datetime")]
    date: String,
    #[serde(alias = "Open")]
    open: Option<f64>,
    #[serde(alias = "High")]
    high: Option<f64>,
    #[serde(alias = "Low")]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: Option<f64>,
}

impl CsvDataSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load every row of the file, regardless of date range
    pub fn load(&self) -> Result<Vec<RawBar>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open CSV file {}", self.path.display()))?;

        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for (row_idx, record) in reader.deserialize::<CsvRow>().enumerate() {
            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    debug!("Skipping row {}: {}", row_idx + 1, e);
                    skipped += 1;
                    continue;
                }
            };
            match parse_date(&row.date) {
                Some(date) => rows.push(RawBar {
                    date,
                    open: row.open,
                    high: row.high,
                    low: row.low,
                    close: row.close,
                }),
                None => {
                    debug!("Skipping row {}: bad date {:?}", row_idx + 1, row.date);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} unreadable rows in {}", skipped, self.path.display());
        }

        Ok(rows)
    }
}

impl MarketDataSource for CsvDataSource {
    fn fetch(&self, ticker: &Ticker, range: DateRange) -> Vec<RawBar> {
        match self.load() {
            Ok(rows) => {
                let rows: Vec<RawBar> = rows.into_iter().filter(|r| range.contains(r.date)).collect();
                info!(
                    "Loaded {} rows for {} from {}",
                    rows.len(),
                    ticker,
                    self.path.display()
                );
                rows
            }
            Err(e) => {
                warn!("No data for {}: {:#}", ticker, e);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Coerce a date or datetime string to a calendar date
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

// =============================================================================
// Normalization
// =============================================================================

/// True when at least one row carries a close price
pub fn has_close_prices(raw: &[RawBar]) -> bool {
    raw.iter().any(|r| r.close.is_some())
}

/// Clean raw rows into a strictly ascending, date-unique bar series.
///
/// Incomplete rows are dropped first, then later rows repeating an earlier
/// date, then the survivors are sorted by date.
pub fn normalize(raw: &[RawBar]) -> Vec<PriceBar> {
    let mut bars: Vec<PriceBar> = raw
        .iter()
        .filter_map(RawBar::to_price_bar)
        .unique_by(|bar| bar.date)
        .collect();

    bars.sort_by_key(|bar| bar.date);

    let dropped = raw.len() - bars.len();
    if dropped > 0 {
        debug!("Dropped {} incomplete or duplicate rows", dropped);
    }

    bars
}

// =============================================================================
// Tests
// =============================================================================
