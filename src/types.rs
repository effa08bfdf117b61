//! Core data types shared by every pipeline stage

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Exchange ticker symbol as the data provider spells it (`TCS.NS`, `^NSEI`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(s: impl Into<String>) -> Self {
        Ticker(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, tradeable instrument from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub display_name: String,
    pub ticker: Ticker,
}

impl Instrument {
    pub fn new(display_name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ticker: Ticker::new(ticker),
        }
    }
}

/// Default first day of the analysis window
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default()
}

/// Requested calendar range.
///
/// No ordering check is made between `start` and `end`; an inverted range
/// is handed to the provider as is and comes back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    /// Exclusive upper bound
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: default_start_date(),
            end: Local::now().date_naive(),
        }
    }
}

/// Daily row as delivered by a market data source. Any price may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

impl RawBar {
    /// Row with every price present
    pub fn complete(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
        }
    }

    /// Project to the four price fields, if all are present and finite
    pub fn to_price_bar(&self) -> Option<PriceBar> {
        let (open, high, low, close) = (self.open?, self.high?, self.low?, self.close?);
        if ![open, high, low, close].iter().all(|v| v.is_finite()) {
            return None;
        }
        Some(PriceBar {
            date: self.date,
            open,
            high,
            low,
            close,
        })
    }
}

/// Cleaned OHLC bar, one per trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Rolling statistics at one date. All three are `None` until the window fills.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPoint {
    pub date: NaiveDate,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    pub volatility: Option<f64>,
}

/// Date-aligned rolling statistics for a normalized bar series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySeries {
    pub window: usize,
    pub points: Vec<VolatilityPoint>,
}

impl VolatilitySeries {
    /// `(date, volatility)` for every point where the ratio is defined
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.volatility.map(|v| (p.date, v)))
    }

    pub fn defined_count(&self) -> usize {
        self.defined().count()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_raw_bar_projection() {
        let full = RawBar::complete(day(2), 1.0, 2.0, 0.5, 1.5);
        assert_eq!(full.to_price_bar().unwrap().close, 1.5);

        let mut missing = full.clone();
        missing.low = None;
        assert!(missing.to_price_bar().is_none());

        let mut nan = full;
        nan.open = Some(f64::NAN);
        assert!(nan.to_price_bar().is_none());
    }

    #[test]
    fn test_date_range_is_end_exclusive() {
        let range = DateRange::new(day(1), day(5));
        assert!(range.contains(day(1)));
        assert!(range.contains(day(4)));
        assert!(!range.contains(day(5)));

        let inverted = DateRange::new(day(5), day(1));
        assert!(!inverted.contains(day(3)));
    }

    #[test]
    fn test_default_range_starts_2022() {
        let range = DateRange::default();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
    }

    #[test]
    fn test_ticker_display() {
        let ticker = Ticker::new("TCS.NS");
        assert_eq!(ticker.to_string(), "TCS.NS");
        assert_eq!(ticker.as_str(), "TCS.NS");
        assert_eq!(serde_json::to_string(&ticker).unwrap(), "\"TCS.NS\"");
    }
}
