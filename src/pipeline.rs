//! One volatility run: lookup, fetch, clean, compute, render.
//!
//! A [`VolatilityAnalyzer`] only borrows the catalog and the data source, so a
//! host serving several users gives each run its own analyzer and nothing is
//! carried over between runs.

use serde::Serialize;
use tracing::{info, instrument};

use crate::chart::{self, ChartPayload, HIGH_VOL_QUANTILE};
use crate::catalog::Catalog;
use crate::data::{self, MarketDataSource};
use crate::error::{PipelineError, PipelineResult};
use crate::volatility::{self, DEFAULT_WINDOW};
use crate::{DateRange, Instrument, VolatilitySeries};

/// Successful outcome of a run
#[derive(Debug, Clone, Serialize)]
pub struct VolatilityReport {
    pub instrument: Instrument,
    pub range: DateRange,
    /// Rows delivered by the source before cleaning
    pub raw_rows: usize,
    /// Bars left after cleaning
    pub bars: usize,
    pub series: VolatilitySeries,
    pub chart: ChartPayload,
}

impl VolatilityReport {
    /// Most recent defined volatility
    pub fn latest(&self) -> Option<f64> {
        self.series.defined().last().map(|(_, v)| v)
    }

    /// Whether the most recent volatility sits above the threshold
    pub fn is_high_volatility(&self) -> bool {
        self.latest()
            .map(|v| v > self.chart.threshold.y)
            .unwrap_or(false)
    }
}

pub struct VolatilityAnalyzer<'a> {
    catalog: &'a Catalog,
    source: &'a dyn MarketDataSource,
    window: usize,
    threshold_quantile: f64,
}

impl<'a> VolatilityAnalyzer<'a> {
    pub fn new(catalog: &'a Catalog, source: &'a dyn MarketDataSource) -> Self {
        Self {
            catalog,
            source,
            window: DEFAULT_WINDOW,
            threshold_quantile: HIGH_VOL_QUANTILE,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_threshold_quantile(mut self, q: f64) -> Self {
        self.threshold_quantile = q;
        self
    }

    /// Run the full pipeline for one instrument and date range
    #[instrument(skip(self), fields(source = self.source.name(), window = self.window))]
    pub fn analyze(&self, display_name: &str, range: DateRange) -> PipelineResult<VolatilityReport> {
        let instrument = self.catalog.lookup(display_name)?.clone();

        let raw = self.source.fetch(&instrument.ticker, range);
        if !data::has_close_prices(&raw) {
            return Err(PipelineError::DataUnavailable {
                ticker: instrument.ticker,
            });
        }

        let bars = data::normalize(&raw);
        info!("{} clean bars out of {} rows", bars.len(), raw.len());

        let series = volatility::compute(&bars, self.window)?;
        let chart = chart::render_with_threshold(
            &instrument.display_name,
            &series,
            self.threshold_quantile,
        )?;

        Ok(VolatilityReport {
            instrument,
            range,
            raw_rows: raw.len(),
            bars: bars.len(),
            series,
            chart,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawBar, Ticker};
    use chrono::{Duration, NaiveDate};
    use std::cell::Cell;

    struct FixedSource {
        rows: Vec<RawBar>,
        calls: Cell<usize>,
    }

    impl FixedSource {
        fn new(rows: Vec<RawBar>) -> Self {
            Self {
                rows,
                calls: Cell::new(0),
            }
        }
    }

    impl MarketDataSource for FixedSource {
        fn fetch(&self, _ticker: &Ticker, _range: DateRange) -> Vec<RawBar> {
            self.calls.set(self.calls.get() + 1);
            self.rows.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn rows(closes: impl IntoIterator<Item = f64>) -> Vec<RawBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .into_iter()
            .enumerate()
            .map(|(i, c)| RawBar::complete(start + Duration::days(i as i64), c, c, c, c))
            .collect()
    }

    #[test]
    fn test_unknown_instrument_never_fetches() {
        let catalog = Catalog::combined();
        let source = FixedSource::new(rows((0..30).map(|i| 100.0 + i as f64)));
        let analyzer = VolatilityAnalyzer::new(&catalog, &source);

        let err = analyzer.analyze("NOT LISTED", DateRange::default()).unwrap_err();
        assert!(matches!(err, PipelineError::LookupFailure { .. }));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_rows_without_close_are_unavailable() {
        let catalog = Catalog::combined();
        let mut data = rows([1.0, 2.0]);
        for r in &mut data {
            r.close = None;
        }
        let source = FixedSource::new(data);
        let err = VolatilityAnalyzer::new(&catalog, &source)
            .analyze("ITC", DateRange::default())
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::DataUnavailable {
                ticker: Ticker::new("ITC.NS")
            }
        );
    }

    #[test]
    fn test_report_flags_high_volatility() {
        let catalog = Catalog::combined();
        // calm then a burst at the end
        let closes = (0..40).map(|i| if i < 35 { 100.0 + (i % 2) as f64 } else { 100.0 + 10.0 * (i - 34) as f64 });
        let source = FixedSource::new(rows(closes));
        let report = VolatilityAnalyzer::new(&catalog, &source)
            .with_window(5)
            .analyze("WIPRO", DateRange::default())
            .unwrap();

        assert_eq!(report.bars, 40);
        assert_eq!(report.series.defined_count(), 36);
        assert!(report.is_high_volatility());
    }
}
