//! Compensation pass: amount summary, per-reason breakdown and the
//! seasonal stacked-area chart.

use super::{ensure_dir, PassContext};
use crate::analysis::{
    breakdown_by_reason, pivot_by_month_day_and_reason, summarize_amounts, CompensationSummary,
    ReasonBreakdown,
};
use crate::charts;
use crate::report::{generate_compensation_report, render_table, write_text_report};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

pub const RESULTS_FILE: &str = "compensation_analysis_results.txt";
pub const STACKED_AREA_CHART: &str = "compensation_stacked_area.png";

#[derive(Debug, Serialize)]
struct CompensationOutput<'a> {
    summary: &'a CompensationSummary,
    reasons: &'a [ReasonBreakdown],
}

pub fn run(ctx: &PassContext<'_>) -> Result<()> {
    let output_dir = &ctx.config.output.output_dir;
    ensure_dir(output_dir)?;

    let table = ctx.load()?;
    let spinner = ctx.spinner("Analyzing compensations...");

    let summary = summarize_amounts(&table);
    let reasons = breakdown_by_reason(&table);
    info!(
        "{} compensated shipments across {} reasons",
        summary.compensated_transactions,
        reasons.len()
    );

    let report = generate_compensation_report(&summary, &reasons);
    let results_path = output_dir.join(RESULTS_FILE);
    write_text_report(&report, &results_path)
        .with_context(|| format!("Failed to write {}", results_path.display()))?;
    info!("Compensation results saved to {}", results_path.display());

    let pivot = pivot_by_month_day_and_reason(&table);
    ctx.render_chart(&output_dir.join(STACKED_AREA_CHART), |path| {
        charts::stacked_area_chart(&pivot, path)
    });

    spinner.finish();

    ctx.emit(
        || {
            format!(
                "💰 Compensation analysis\n\n{}\n{}",
                report,
                render_table("Compensation by Reason", &reasons)
            )
        },
        &CompensationOutput {
            summary: &summary,
            reasons: &reasons,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_results_file() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, &sample_rows());

        run(&quiet(&config)).unwrap();

        let report = read(dir.path().join("output").join(RESULTS_FILE));
        assert!(report.starts_with("Compensation Amounts Summary:\n"));
        assert!(report.contains("Total Compensation Amount: $40.00\n"));
        assert!(report.contains("Median Compensation Amount: $10.00\n"));
        assert!(report.contains("Lost: Count = 2, Total Amount = $30.00"));
        assert!(report.contains("Damaged: Count = 1, Total Amount = $10.00"));
        // Charts are disabled in the fixture config.
        assert!(!dir.path().join("output").join(STACKED_AREA_CHART).exists());
    }
}
