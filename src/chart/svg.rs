//! SVG drawing surface for a [`ChartPayload`]

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;

use super::{ChartPayload, LineDash, LineStyle};

const DASH_SEGMENTS: usize = 60;

fn color_of(style: &LineStyle) -> RGBColor {
    match style.color.as_str() {
        "red" => RED,
        "black" => BLACK,
        "green" => GREEN,
        _ => BLUE,
    }
}

fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

/// Padded y-axis range; floored at zero unless the data goes negative
fn y_bounds(min_value: f64, max_value: f64) -> (f64, f64) {
    let padding = ((max_value - min_value) * 0.1).max(1e-6);
    let y_min = if min_value >= 0.0 {
        (min_value - padding).max(0.0)
    } else {
        min_value - padding
    };
    (y_min, max_value + padding)
}

/// Render the payload as an SVG document of `width` x `height` pixels
pub fn draw(payload: &ChartPayload, (width, height): (u32, u32)) -> Result<String> {
    let origin = payload.threshold.x0;
    let span = day_offset(origin, payload.threshold.x1).max(1.0);

    let (min_value, max_value) = payload.value_bounds();
    let (y_min, y_max) = y_bounds(min_value, max_value);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("Failed to fill canvas: {}", e))?;

        let margins = &payload.margins;
        let root = root.margin(margins.top, margins.bottom, margins.left, margins.right);

        let caption = format!("{} | {}", payload.subtitle, payload.title);
        let mut chart = ChartBuilder::on(&root)
            .caption(&caption, ("sans-serif", 24).into_font())
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..span, y_min..y_max)
            .map_err(|e| anyhow!("Failed to build chart: {}", e))?;

        let x_label = |x: &f64| {
            (origin + Duration::days(x.round() as i64))
                .format("%Y-%m-%d")
                .to_string()
        };
        chart
            .configure_mesh()
            .x_desc(payload.x_axis_title.as_str())
            .y_desc(payload.y_axis_title.as_str())
            .x_label_formatter(&x_label)
            .draw()
            .map_err(|e| anyhow!("Failed to draw mesh: {}", e))?;

        let line_color = color_of(&payload.line.style);
        chart
            .draw_series(LineSeries::new(
                payload
                    .line
                    .points
                    .iter()
                    .map(|p| (day_offset(origin, p.date), p.value)),
                line_color.stroke_width(2),
            ))
            .map_err(|e| anyhow!("Failed to draw volatility line: {}", e))?
            .label(payload.line.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));

        // Threshold as alternating on/off segments
        let threshold = &payload.threshold;
        let threshold_color = color_of(&threshold.style);
        let x1 = day_offset(origin, threshold.x1);
        let segments: Vec<Vec<(f64, f64)>> = match threshold.style.dash {
            LineDash::Solid => vec![vec![(0.0, threshold.y), (x1, threshold.y)]],
            LineDash::Dash => {
                let step = x1 / DASH_SEGMENTS as f64;
                (0..DASH_SEGMENTS)
                    .step_by(2)
                    .map(|i| {
                        vec![
                            (i as f64 * step, threshold.y),
                            ((i + 1) as f64 * step, threshold.y),
                        ]
                    })
                    .collect()
            }
        };
        chart
            .draw_series(
                segments
                    .into_iter()
                    .map(|seg| PathElement::new(seg, threshold_color.stroke_width(2))),
            )
            .map_err(|e| anyhow!("Failed to draw threshold: {}", e))?
            .label(threshold.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], threshold_color));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| anyhow!("Failed to draw legend: {}", e))?;

        root.present()
            .map_err(|e| anyhow!("Failed to render chart: {}", e))?;
    }

    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::render;
    use crate::{VolatilityPoint, VolatilitySeries};

    #[test]
    fn test_draw_produces_svg_document() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = VolatilitySeries {
            window: 2,
            points: (0..10)
                .map(|i| VolatilityPoint {
                    date: start + Duration::days(i),
                    rolling_mean: Some(100.0),
                    rolling_std: Some(i as f64),
                    volatility: (i > 0).then(|| i as f64 / 100.0),
                })
                .collect(),
        };
        let payload = render("INFOSYS", &series).unwrap();

        let svg = draw(&payload, (800, 400)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_y_bounds() {
        let (lo, hi) = y_bounds(0.001, 0.05);
        assert_eq!(lo, 0.0);
        assert!(hi > 0.05);

        // negative ratios come from a negative rolling mean
        let (lo, hi) = y_bounds(-0.3, -0.1);
        assert!(lo < -0.3);
        assert!(hi > -0.1);
        assert!(lo < hi);

        let (lo, hi) = y_bounds(0.0, 0.0);
        assert_eq!(lo, 0.0);
        assert!(hi > 0.0);
    }
}
