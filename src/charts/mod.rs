//! PNG chart rendering.
//!
//! All charts use the [`plotters`] bitmap backend at a fixed 1200x800
//! resolution with the default sans-serif font, so they render in
//! headless environments.

use crate::analysis::{MonthDayAverages, ReasonBreakdown, SeasonalPivot};
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

const RESOLUTION: (u32, u32) = (1200, 800);

/// Month-day labels shown along the x axis at most.
const MAX_X_LABELS: usize = 24;

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, ChartError>;

/// Value range with a little headroom; degenerate ranges are widened.
fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Range starting at zero, for amounts and stacked totals.
fn zero_based_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    if max <= 0.0 {
        0.0..1.0
    } else {
        0.0..max * 1.05
    }
}

fn label_at(labels: &[String], index: usize) -> String {
    labels.get(index).cloned().unwrap_or_default()
}

/// Stacked-area chart of compensation amount per month-day, one layer per reason.
pub fn stacked_area_chart(pivot: &SeasonalPivot, path: &Path) -> Result<()> {
    if pivot.is_empty() {
        return Err(ChartError::InvalidData(
            "No compensated shipments with a reason".to_string(),
        ));
    }

    let layers = pivot.stacked();
    let last_index = pivot.month_days.len().saturating_sub(1).max(1);
    let y_range = zero_based_range(layers.last().into_iter().flatten().copied());

    let drawing_area = BitMapBackend::new(path, RESOLUTION).into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&drawing_area)
        .caption(
            "Proportion of Compensation Amount by Shipment Date and Reason",
            ("sans-serif", 32),
        )
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(85)
        .build_cartesian_2d(0usize..last_index, y_range)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Month-Day")
        .y_desc("Total Compensation Amount")
        .x_labels(pivot.month_days.len().min(MAX_X_LABELS))
        .x_label_formatter(&|x| label_at(&pivot.month_days, *x))
        .label_style(("sans-serif", 18))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    // Tallest layer first so lower layers paint over it.
    for (index, layer) in layers.iter().enumerate().rev() {
        let color = Palette99::pick(index).to_rgba();
        let reason = label_at(&pivot.reasons, index);
        chart
            .draw_series(
                AreaSeries::new(
                    layer.iter().copied().enumerate(),
                    0.0,
                    color.mix(0.7).filled(),
                )
                .border_style(color.stroke_width(1)),
            )
            .map_err(|e| ChartError::Drawing(e.to_string()))?
            .label(reason)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 18))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    Ok(())
}

/// Two-line overlay of average delivery time and compensation amount per month-day.
pub fn seasonal_line_chart(days: &[MonthDayAverages], path: &Path) -> Result<()> {
    if days.is_empty() {
        return Err(ChartError::InvalidData(
            "No month-days with both averages".to_string(),
        ));
    }

    let labels: Vec<String> = days.iter().map(|d| d.shipped_date_mmdd.clone()).collect();
    let last_index = days.len().saturating_sub(1).max(1);
    let y_range = zero_based_range(
        days.iter()
            .flat_map(|d| [d.avg_delivery_time, d.avg_compensation_amount]),
    );

    let drawing_area = BitMapBackend::new(path, RESOLUTION).into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&drawing_area)
        .caption(
            "Seasonal Patterns of Delivery Time and Compensation Amount",
            ("sans-serif", 32),
        )
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(85)
        .build_cartesian_2d(0usize..last_index, y_range)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Month-Day")
        .y_desc("Value")
        .x_labels(labels.len().min(MAX_X_LABELS))
        .x_label_formatter(&|x| label_at(&labels, *x))
        .label_style(("sans-serif", 18))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(
            days.iter().map(|d| d.avg_delivery_time).enumerate(),
            &BLUE,
        ))
        .map_err(|e| ChartError::Drawing(e.to_string()))?
        .label("avg_delivery_time")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(
            days.iter().map(|d| d.avg_compensation_amount).enumerate(),
            &RED,
        ))
        .map_err(|e| ChartError::Drawing(e.to_string()))?
        .label("avg_compensation_amount")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 18))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    Ok(())
}

/// Scatter of average delivery time against average compensation amount.
pub fn correlation_scatter(days: &[MonthDayAverages], path: &Path) -> Result<()> {
    if days.is_empty() {
        return Err(ChartError::InvalidData(
            "No month-days with both averages".to_string(),
        ));
    }

    let x_range = padded_range(days.iter().map(|d| d.avg_delivery_time));
    let y_range = padded_range(days.iter().map(|d| d.avg_compensation_amount));

    let drawing_area = BitMapBackend::new(path, RESOLUTION).into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&drawing_area)
        .caption(
            "Correlation Between Average Delivery Time and Compensation Amount",
            ("sans-serif", 32),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Average Delivery Time (days)")
        .y_desc("Average Compensation Amount")
        .label_style(("sans-serif", 20))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(days.iter().map(|d| {
            Circle::new(
                (d.avg_delivery_time, d.avg_compensation_amount),
                5,
                BLUE.filled(),
            )
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    Ok(())
}

/// Horizontal bars of average compensation per reason, most common reason on top.
///
/// `reasons` is expected in breakdown order (descending count).
pub fn reasons_bar_chart(reasons: &[ReasonBreakdown], path: &Path) -> Result<()> {
    if reasons.is_empty() {
        return Err(ChartError::InvalidData(
            "No compensation reasons to plot".to_string(),
        ));
    }

    let count = reasons.len();
    // Segment 0 is at the bottom, so the first reason takes the last segment.
    let labels: Vec<String> = reasons
        .iter()
        .rev()
        .map(|r| r.compensation_reason.clone())
        .collect();
    let x_range = zero_based_range(reasons.iter().map(|r| r.avg_amount));

    let drawing_area = BitMapBackend::new(path, RESOLUTION).into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&drawing_area)
        .caption(
            "Compensation Reasons by Frequency with Average Compensation Amount",
            ("sans-serif", 32),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(220)
        .build_cartesian_2d(x_range, (0usize..count).into_segmented())
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Average Compensation Amount")
        .y_desc("Compensation Reason")
        .y_labels(count)
        .y_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(index) | SegmentValue::Exact(index) => {
                label_at(&labels, *index)
            }
            SegmentValue::Last => String::new(),
        })
        .label_style(("sans-serif", 18))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(reasons.iter().enumerate().map(|(rank, reason)| {
            let segment = count - 1 - rank;
            let color = Palette99::pick(rank).to_rgba();
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(segment)),
                    (reason.avg_amount, SegmentValue::Exact(segment + 1)),
                ],
                color.filled(),
            );
            bar.set_margin(6, 6, 0, 0);
            bar
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn days() -> Vec<MonthDayAverages> {
        vec![
            MonthDayAverages {
                shipped_date_mmdd: "01-15".to_string(),
                avg_delivery_time: 3.0,
                avg_compensation_amount: 12.0,
            },
            MonthDayAverages {
                shipped_date_mmdd: "01-16".to_string(),
                avg_delivery_time: 5.0,
                avg_compensation_amount: 20.0,
            },
        ]
    }

    fn reasons() -> Vec<ReasonBreakdown> {
        vec![
            ReasonBreakdown {
                compensation_reason: "Lost".to_string(),
                count: 2,
                total_amount: 30.0,
                avg_amount: 15.0,
                transaction_weight: 66.67,
                amount_weight: 75.0,
            },
            ReasonBreakdown {
                compensation_reason: "Damaged".to_string(),
                count: 1,
                total_amount: 10.0,
                avg_amount: 10.0,
                transaction_weight: 33.33,
                amount_weight: 25.0,
            },
        ]
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([2.0, 2.0]), 1.0..3.0);
        assert_eq!(padded_range(Vec::<f64>::new()), 0.0..1.0);

        let range = padded_range([0.0, 10.0]);
        assert!((range.start + 0.5).abs() < 1e-9);
        assert!((range.end - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_based_range() {
        assert_eq!(zero_based_range([0.0, 0.0]), 0.0..1.0);
        let range = zero_based_range([4.0, 20.0, f64::NAN]);
        assert_eq!(range.start, 0.0);
        assert!((range.end - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.png");

        assert!(matches!(
            stacked_area_chart(&SeasonalPivot::default(), &path),
            Err(ChartError::InvalidData(_))
        ));
        assert!(matches!(
            seasonal_line_chart(&[], &path),
            Err(ChartError::InvalidData(_))
        ));
        assert!(matches!(
            correlation_scatter(&[], &path),
            Err(ChartError::InvalidData(_))
        ));
        assert!(matches!(
            reasons_bar_chart(&[], &path),
            Err(ChartError::InvalidData(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_render_all_charts() {
        let dir = TempDir::new().unwrap();

        let pivot = SeasonalPivot {
            month_days: vec!["01-15".to_string(), "01-16".to_string()],
            reasons: vec!["Damaged".to_string(), "Lost".to_string()],
            series: vec![vec![10.0, 0.0], vec![5.0, 25.0]],
        };
        let stacked = dir.path().join("stacked.png");
        stacked_area_chart(&pivot, &stacked).unwrap();
        assert!(fs::metadata(&stacked).unwrap().len() > 0);

        let seasonal = dir.path().join("seasonal.png");
        seasonal_line_chart(&days(), &seasonal).unwrap();
        assert!(seasonal.exists());

        let scatter = dir.path().join("scatter.png");
        correlation_scatter(&days(), &scatter).unwrap();
        assert!(scatter.exists());

        let bars = dir.path().join("bars.png");
        reasons_bar_chart(&reasons(), &bars).unwrap();
        assert!(bars.exists());
    }
}
