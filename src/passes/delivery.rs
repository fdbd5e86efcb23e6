//! Delivery pass: consolidated route and sortation-center KPIs,
//! month-day seasonality and correlation, and the plain-text summary.

use super::{ensure_dir, PassContext};
use crate::analysis::{analyze_correlation, compute_metrics, consolidate, format_coefficient, MonthDayAverages};
use crate::charts;
use crate::models::Metrics;
use crate::report::{generate_delivery_summary, write_csv, write_text_report, ConsolidatedRow};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

pub const CONSOLIDATED_FILE: &str = "consolidated_analysis_results.csv";
pub const CORRELATION_FILE: &str = "correlation_analysis_results.csv";
pub const SUMMARY_FILE: &str = "analysis_results.txt";
pub const SEASONAL_CHART: &str = "seasonal_patterns.png";
pub const CORRELATION_CHART: &str = "correlation_plot.png";

#[derive(Debug, Serialize)]
struct DeliveryOutput<'a> {
    partitions: &'a [ConsolidatedRow],
    correlation: Option<f64>,
    by_month_day: &'a [MonthDayAverages],
    summary: &'a Metrics,
}

pub fn run(ctx: &PassContext<'_>) -> Result<()> {
    let results_dir = &ctx.config.output.results_dir;
    ensure_dir(results_dir)?;

    let table = ctx.load()?;
    let spinner = ctx.spinner("Analyzing delivery performance...");

    // Consolidated table
    let partitions = consolidate(&table, ctx.config.consolidated_thresholds());
    let rows: Vec<ConsolidatedRow> = partitions.iter().map(ConsolidatedRow::from).collect();
    let consolidated_path = results_dir.join(CONSOLIDATED_FILE);
    write_csv(&rows, &consolidated_path)?;
    info!(
        "{} partitions saved to {}",
        rows.len(),
        consolidated_path.display()
    );

    // Seasonality and correlation
    let correlation = analyze_correlation(&table);
    ctx.render_chart(&results_dir.join(SEASONAL_CHART), |path| {
        charts::seasonal_line_chart(&correlation.by_month_day, path)
    });

    let correlation_path = results_dir.join(CORRELATION_FILE);
    write_csv(&correlation.by_month_day, &correlation_path)?;
    info!(
        "Correlation between average delivery time and compensation amount: {}",
        format_coefficient(correlation.coefficient)
    );
    ctx.render_chart(&results_dir.join(CORRELATION_CHART), |path| {
        charts::correlation_scatter(&correlation.by_month_day, path)
    });

    // Text summary
    let summary = compute_metrics(&table, ctx.config.summary_thresholds());
    let text = generate_delivery_summary(&summary);
    let summary_path = results_dir.join(SUMMARY_FILE);
    write_text_report(&text, &summary_path)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;
    info!("Delivery summary saved to {}", summary_path.display());

    spinner.finish();

    ctx.emit(
        || {
            format!(
                "🚚 Delivery performance\n\n\
                 Correlation between average delivery time and compensation amount: {}\n\n{}",
                format_coefficient(correlation.coefficient),
                text
            )
        },
        &DeliveryOutput {
            partitions: &rows,
            correlation: correlation.coefficient,
            by_month_day: &correlation.by_month_day,
            summary: &summary,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_all_results() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, &sample_rows());

        run(&quiet(&config)).unwrap();

        let results = dir.path().join("results");
        let consolidated = read(results.join(CONSOLIDATED_FILE));
        let lines: Vec<&str> = consolidated.lines().collect();
        // Header, two routes, two sortation-center pairs.
        assert_eq!(lines.len(), 5);
        assert!(lines[1].ends_with(",Route,IT->FR"));
        assert!(lines[2].ends_with(",Route,FR->IT"));
        assert!(lines[3].ends_with(",Sortation Center,LYO1 -> PAR1"));
        assert!(lines[4].ends_with(",Sortation Center,PAR1 -> LYO1"));

        let correlation = read(results.join(CORRELATION_FILE));
        assert!(correlation.starts_with("shipped_date_mmdd,avg_delivery_time,avg_compensation_amount\n"));
        // 01-15 merges 2023 and 2024: delivery mean 4, compensation mean 10.
        assert!(correlation.contains("01-15,4.0,10.0\n"));

        let summary = read(results.join(SUMMARY_FILE));
        assert!(summary.starts_with("Average Delivery Time: 5.00 business days\n"));
        // Summary threshold is 5 days: 3 of 4 parcels.
        assert!(summary.contains("On-Time Delivery Rate: 75.00%\n"));
        assert!(summary.contains("Compensation Rate: 75.00%\n"));
        assert!(summary.contains("Customer Service Ticket Rate: 50.00%\n"));
        // (5 + 2 + 10) / 3
        assert!(summary.contains("Average Resolution Time: 5.67 days\n"));
    }

    #[test]
    fn test_consolidated_rates_use_configured_threshold() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir, &sample_rows());
        config.metrics.on_time_days = 4;

        run(&quiet(&config)).unwrap();

        let consolidated = read(dir.path().join("results").join(CONSOLIDATED_FILE));
        let it_fr = consolidated
            .lines()
            .find(|l| l.ends_with(",Route,IT->FR"))
            .unwrap();
        let fields: Vec<&str> = it_fr.split(',').collect();
        // IT->FR delivered in 3, 5 and 4 days: two of three within 4 days.
        let on_time: f64 = fields[1].parse().unwrap();
        assert!((on_time - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_blank_center_code_is_not_a_partition() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            &[
                "2024-01-15,,5,0,,,IT->FR,,PAR1",
                "2024-01-16,,3,0,,,IT->FR,LYO1,PAR1",
            ],
        );

        run(&quiet(&config)).unwrap();

        let consolidated = read(dir.path().join("results").join(CONSOLIDATED_FILE));
        let lines: Vec<&str> = consolidated.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",2,0.0,,Route,IT->FR"));
        assert!(lines[2].ends_with(",1,0.0,,Sortation Center,LYO1 -> PAR1"));
    }
}
