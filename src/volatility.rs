//! Volatility calculator
//!
//! Rolling mean and sample standard deviation of the close, and their ratio
//! (coefficient of variation) as the volatility signal.

use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::indicators::{coefficient_of_variation, rolling_mean, rolling_std};
use crate::{PriceBar, VolatilityPoint, VolatilitySeries};

/// Trailing window length in trading days
pub const DEFAULT_WINDOW: usize = 20;

/// Compute rolling statistics over the close of an already normalized series.
///
/// Fails with `ComputationFailure` for a window shorter than two bars or a
/// non-finite close, and with `InsufficientHistory` when no point ends up
/// with a defined volatility.
pub fn compute(bars: &[PriceBar], window: usize) -> PipelineResult<VolatilitySeries> {
    if window < 2 {
        return Err(PipelineError::computation(format!(
            "rolling window must span at least 2 bars, got {}",
            window
        )));
    }

    if let Some(bad) = bars.iter().find(|b| !b.close.is_finite()) {
        return Err(PipelineError::computation(format!(
            "non-finite close {} on {}",
            bad.close, bad.date
        )));
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let means = rolling_mean(&closes, window);
    let stds = rolling_std(&closes, window);

    let points: Vec<VolatilityPoint> = bars
        .iter()
        .zip(means.into_iter().zip(stds))
        .map(|(bar, (rolling_mean, rolling_std))| VolatilityPoint {
            date: bar.date,
            rolling_mean,
            rolling_std,
            volatility: coefficient_of_variation(rolling_std, rolling_mean),
        })
        .collect();

    let series = VolatilitySeries { window, points };
    let defined = series.defined_count();
    debug!("{} of {} points have a defined volatility", defined, series.len());

    if defined == 0 {
        return Err(PipelineError::InsufficientHistory {
            available: bars.len(),
            window,
        });
    }

    info!(
        "Computed {}-bar volatility over {} bars ({} defined)",
        window,
        bars.len(),
        defined
    );

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect()
    }

    #[test]
    fn test_warmup_points_are_undefined() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 4) as f64).collect();
        let series = compute(&bars_from_closes(&closes), DEFAULT_WINDOW).unwrap();

        assert_eq!(series.len(), 30);
        for p in &series.points[..DEFAULT_WINDOW - 1] {
            assert!(p.rolling_mean.is_none());
            assert!(p.rolling_std.is_none());
            assert!(p.volatility.is_none());
        }
        for p in &series.points[DEFAULT_WINDOW - 1..] {
            assert!(p.volatility.is_some());
        }
    }

    #[test]
    fn test_constant_prices_have_zero_volatility() {
        let series = compute(&bars_from_closes(&[250.0; 25]), DEFAULT_WINDOW).unwrap();
        let last = series.points.last().unwrap();
        assert_eq!(last.rolling_std, Some(0.0));
        assert_eq!(last.volatility, Some(0.0));
    }

    #[test]
    fn test_zero_mean_is_undefined_not_an_error() {
        let closes = [1.0, -1.0, 1.0, -1.0, 2.0, 2.0];
        let series = compute(&bars_from_closes(&closes), 2).unwrap();

        // windows ending at 1, 2, 3 average to zero
        assert_eq!(series.points[1].rolling_mean, Some(0.0));
        assert!(series.points[1].volatility.is_none());
        assert!(series.points[3].volatility.is_none());
        assert!(series.points[5].volatility.is_some());
    }

    #[test]
    fn test_ratio_matches_std_over_mean() {
        let closes = [10.0, 12.0, 14.0];
        let series = compute(&bars_from_closes(&closes), 3).unwrap();
        let p = series.points[2];
        assert_relative_eq!(p.rolling_mean.unwrap(), 12.0);
        assert_relative_eq!(p.rolling_std.unwrap(), 2.0);
        assert_relative_eq!(p.volatility.unwrap(), 2.0 / 12.0);
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let err = compute(&bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]), 20).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InsufficientHistory {
                available: 5,
                window: 20
            }
        );
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        let err = compute(&[], DEFAULT_WINDOW).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientHistory { available: 0, .. }));
    }

    #[test]
    fn test_degenerate_window_fails_computation() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            compute(&bars, 1),
            Err(PipelineError::ComputationFailure { .. })
        ));
        assert!(matches!(
            compute(&bars, 0),
            Err(PipelineError::ComputationFailure { .. })
        ));
    }

    #[test]
    fn test_non_finite_close_fails_computation() {
        let mut bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        bars[1].close = f64::INFINITY;
        let err = compute(&bars, 2).unwrap_err();
        match err {
            PipelineError::ComputationFailure { cause } => assert!(cause.contains("non-finite")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
