//! Lane review pass: correlation on one origin/destination lane and
//! reason frequencies over all shipments.
//!
//! Missing input columns are synthesized so the review can run against
//! partial exports.

use super::{ensure_dir, PassContext};
use crate::analysis::{analyze_correlation, breakdown_by_reason, format_coefficient, MonthDayAverages};
use crate::charts;
use crate::report::{render_table, write_csv, ReasonCountRow};
use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

pub const CORRELATION_FILE: &str = "correlation_analysis_results.csv";
pub const CORRELATION_CHART: &str = "correlation_plot.png";
pub const REASONS_FILE: &str = "compensation_reasons_analysis.csv";
pub const REASONS_CHART: &str = "compensation_reasons_plot.png";

#[derive(Debug, Serialize)]
struct ReviewOutput<'a> {
    lane: String,
    lane_shipments: usize,
    correlation: Option<f64>,
    by_month_day: &'a [MonthDayAverages],
    reasons: &'a [ReasonCountRow],
}

pub fn run(ctx: &PassContext<'_>) -> Result<()> {
    let output_dir = &ctx.config.output.output_dir;
    ensure_dir(output_dir)?;

    let table = ctx.load_with_fixture()?;
    let spinner = ctx.spinner("Reviewing lane...");

    let review = &ctx.config.review;
    let lane_name = format!("{} -> {}", review.from_sc_code, review.to_sc_code);
    let lane = table.lane(&review.from_sc_code, &review.to_sc_code);
    if lane.is_empty() {
        warn!("No shipments on lane {}", lane_name);
    } else {
        info!("{} shipments on lane {}", lane.len(), lane_name);
    }

    let correlation = analyze_correlation(&lane);
    info!(
        "Correlation between average delivery time and compensation amount on {}: {}",
        lane_name,
        format_coefficient(correlation.coefficient)
    );
    write_csv(&correlation.by_month_day, &output_dir.join(CORRELATION_FILE))?;
    ctx.render_chart(&output_dir.join(CORRELATION_CHART), |path| {
        charts::correlation_scatter(&correlation.by_month_day, path)
    });

    let reasons = breakdown_by_reason(&table);
    let rows: Vec<ReasonCountRow> = reasons.iter().map(ReasonCountRow::from).collect();
    let reasons_path = output_dir.join(REASONS_FILE);
    write_csv(&rows, &reasons_path)?;
    info!("{} reasons saved to {}", rows.len(), reasons_path.display());
    ctx.render_chart(&output_dir.join(REASONS_CHART), |path| {
        charts::reasons_bar_chart(&reasons, path)
    });

    spinner.finish();

    ctx.emit(
        || {
            format!(
                "🔎 Lane review ({})\n\n\
                 Correlation between average delivery time and compensation amount: {}\n\n{}",
                lane_name,
                format_coefficient(correlation.coefficient),
                render_table("Compensation Reasons", &rows)
            )
        },
        &ReviewOutput {
            lane: lane_name.clone(),
            lane_shipments: lane.len(),
            correlation: correlation.coefficient,
            by_month_day: &correlation.by_month_day,
            reasons: &rows,
        },
    )
}
