//! Chart payload
//!
//! Turns a volatility series into a presentation-neutral line chart: the
//! defined volatility points plus a dashed horizontal high-volatility
//! threshold at a quantile of those points. Drawing is left to a surface
//! such as [`svg::draw`].

pub mod svg;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::indicators::quantile;
use crate::VolatilitySeries;

/// Quantile used for the high-volatility threshold
pub const HIGH_VOL_QUANTILE: f64 = 0.75;

pub const CHART_TITLE: &str = "Volatility Over Time";
pub const X_AXIS_TITLE: &str = "Date";
pub const Y_AXIS_TITLE: &str = "Volatility";
pub const SERIES_NAME: &str = "Volatility";
pub const THRESHOLD_NAME: &str = "High Vol Threshold";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub dash: LineDash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<ChartPoint>,
    pub style: LineStyle,
}

/// Horizontal segment from `x0` to `x1` at height `y`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub name: String,
    pub x0: NaiveDate,
    pub x1: NaiveDate,
    pub y: f64,
    pub quantile: f64,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 40,
            right: 40,
            top: 40,
            bottom: 40,
        }
    }
}

/// Everything a surface needs to draw the volatility chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub title: String,
    pub subtitle: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub line: LineSeries,
    pub threshold: ReferenceLine,
    pub margins: Margins,
}

impl ChartPayload {
    /// Smallest and largest plotted value, threshold included
    pub fn value_bounds(&self) -> (f64, f64) {
        self.line.points.iter().map(|p| p.value).fold(
            (self.threshold.y, self.threshold.y),
            |(lo, hi), v| (lo.min(v), hi.max(v)),
        )
    }
}

/// Build the payload with the threshold at the 75th percentile
pub fn render(instrument_name: &str, series: &VolatilitySeries) -> PipelineResult<ChartPayload> {
    render_with_threshold(instrument_name, series, HIGH_VOL_QUANTILE)
}

/// Build the payload with the threshold at quantile `q` of the defined values.
///
/// The threshold spans the full date range of the series, warm-up dates
/// included. Without any defined value there is nothing to plot.
pub fn render_with_threshold(
    instrument_name: &str,
    series: &VolatilitySeries,
    q: f64,
) -> PipelineResult<ChartPayload> {
    let points: Vec<ChartPoint> = series
        .defined()
        .map(|(date, value)| ChartPoint { date, value })
        .collect();

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let (Some(y), Some(x0), Some(x1)) = (
        quantile(&values, q),
        series.first_date(),
        series.last_date(),
    ) else {
        return Err(PipelineError::InsufficientHistory {
            available: series.len(),
            window: series.window,
        });
    };

    debug!(
        "Chart: {} points, threshold {:.6} at q={}",
        points.len(),
        y,
        q
    );

    Ok(ChartPayload {
        title: CHART_TITLE.to_string(),
        subtitle: format!("{} - Volatility Trend", instrument_name),
        x_axis_title: X_AXIS_TITLE.to_string(),
        y_axis_title: Y_AXIS_TITLE.to_string(),
        line: LineSeries {
            name: SERIES_NAME.to_string(),
            points,
            style: LineStyle {
                color: "blue".to_string(),
                dash: LineDash::Solid,
            },
        },
        threshold: ReferenceLine {
            name: THRESHOLD_NAME.to_string(),
            x0,
            x1,
            y,
            quantile: q,
            style: LineStyle {
                color: "red".to_string(),
                dash: LineDash::Dash,
            },
        },
        margins: Margins::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VolatilityPoint;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn series(values: &[Option<f64>]) -> VolatilitySeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        VolatilitySeries {
            window: 3,
            points: values
                .iter()
                .enumerate()
                .map(|(i, &v)| VolatilityPoint {
                    date: start + Duration::days(i as i64),
                    rolling_mean: v.map(|_| 1.0),
                    rolling_std: v,
                    volatility: v,
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_uses_defined_points_only() {
        let s = series(&[None, None, Some(0.1), Some(0.3), None, Some(0.2)]);
        let payload = render("TCS", &s).unwrap();

        assert_eq!(payload.line.points.len(), 3);
        assert_eq!(payload.title, "Volatility Over Time");
        assert_eq!(payload.subtitle, "TCS - Volatility Trend");
        assert_eq!(payload.x_axis_title, "Date");
        assert_eq!(payload.y_axis_title, "Volatility");
    }

    #[test]
    fn test_threshold_spans_whole_series() {
        let s = series(&[None, None, Some(0.1), Some(0.3), Some(0.2), Some(0.4)]);
        let payload = render("TCS", &s).unwrap();

        assert_eq!(payload.threshold.x0, s.points[0].date);
        assert_eq!(payload.threshold.x1, s.points[5].date);
        // sorted 0.1 0.2 0.3 0.4, pos 2.25
        assert_relative_eq!(payload.threshold.y, 0.325, epsilon = 1e-12);
        assert_eq!(payload.threshold.style.dash, LineDash::Dash);
        assert_eq!(payload.threshold.style.color, "red");
        assert_eq!(payload.threshold.name, "High Vol Threshold");
    }

    #[test]
    fn test_nothing_to_plot() {
        let s = series(&[None, None, None]);
        let err = render("TCS", &s).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientHistory { .. }));
        assert_eq!(err.severity(), crate::Severity::Warning);
    }

    #[test]
    fn test_value_bounds_include_threshold() {
        let s = series(&[Some(0.5)]);
        let payload = render_with_threshold("X", &s, 0.75).unwrap();
        assert_eq!(payload.value_bounds(), (0.5, 0.5));
    }

    #[test]
    fn test_payload_serializes() {
        let s = series(&[None, Some(0.2)]);
        let json = serde_json::to_value(render("ITC", &s).unwrap()).unwrap();
        assert_eq!(json["threshold"]["style"]["dash"], "dash");
        assert_eq!(json["line"]["points"][0]["date"], "2024-03-02");
        assert_eq!(json["margins"]["left"], 40);
    }
}
