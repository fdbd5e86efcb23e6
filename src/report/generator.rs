//! Text report generation.
//!
//! This module renders the plain-text result files, console tables
//! and JSON summaries from the analysis results.

use crate::analysis::{CompensationSummary, ReasonBreakdown};
use crate::models::Metrics;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tabled::{Table, Tabled};

/// Format an optional amount as `$X.XX`, or `$nan` when undefined.
fn money(value: Option<f64>) -> String {
    format!("${}", two_decimals(value))
}

/// Format an optional value with two decimals, or `nan` when undefined.
pub fn two_decimals(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "nan".to_string(),
    }
}

/// Format an optional fraction as a percentage, or `nan%` when undefined.
fn percentage(fraction: Option<f64>) -> String {
    format!("{}%", two_decimals(fraction.map(|f| f * 100.0)))
}

/// Generate the compensation analysis report.
pub fn generate_compensation_report(
    summary: &CompensationSummary,
    reasons: &[ReasonBreakdown],
) -> String {
    let mut output = String::new();

    output.push_str(&generate_amounts_section(summary));
    output.push_str("\n\nCompensation by Reason Summary:\n");
    output.push_str(&generate_reasons_section(reasons));

    output
}

/// Generate the amounts summary section.
fn generate_amounts_section(summary: &CompensationSummary) -> String {
    let mut section = String::new();

    section.push_str("Compensation Amounts Summary:\n");
    section.push_str(&format!(
        "Total Compensation Amount: {}\n",
        money(Some(summary.total))
    ));
    section.push_str(&format!(
        "Average Compensation Amount: {}\n",
        money(summary.average)
    ));
    section.push_str(&format!(
        "Median Compensation Amount: {}\n",
        money(summary.median)
    ));
    section.push_str(&format!(
        "Maximum Compensation Amount: {}\n",
        money(summary.maximum)
    ));
    section.push_str(&format!(
        "Minimum Compensation Amount: {}\n",
        money(summary.minimum)
    ));

    section
}

/// One line per reason.
fn generate_reasons_section(reasons: &[ReasonBreakdown]) -> String {
    reasons
        .iter()
        .map(|r| {
            format!(
                "{}: Count = {}, Total Amount = ${:.2}, Average Amount = ${:.2}, Transaction Weight = {:.2}%, Amount Weight = {:.2}%\n",
                r.compensation_reason,
                r.count,
                r.total_amount,
                r.avg_amount,
                r.transaction_weight,
                r.amount_weight
            )
        })
        .collect()
}

/// Generate the delivery performance text summary.
///
/// `metrics` must have been computed with the summary on-time threshold.
pub fn generate_delivery_summary(metrics: &Metrics) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Average Delivery Time: {} business days\n",
        two_decimals(metrics.avg_delivery_time)
    ));
    output.push_str(&format!(
        "On-Time Delivery Rate: {}\n",
        percentage(metrics.on_time_delivery_rate)
    ));
    output.push_str(&format!(
        "Compensation Rate: {}\n",
        percentage(metrics.compensation_rate)
    ));
    output.push_str(&format!(
        "Average Compensation Amount: {}\n",
        two_decimals(metrics.avg_compensation_amount)
    ));
    output.push_str(&format!(
        "Customer Service Ticket Rate: {}\n",
        percentage(metrics.cs_ticket_rate)
    ));
    output.push_str(&format!(
        "Average Resolution Time: {} days\n",
        two_decimals(metrics.resolution_time_avg)
    ));

    output
}

/// Render rows as a titled console table.
pub fn render_table<T: Tabled>(title: &str, rows: &[T]) -> String {
    let mut output = String::new();

    output.push_str(title);
    output.push('\n');
    output.push_str(&"=".repeat(title.chars().count()));
    output.push('\n');

    if rows.is_empty() {
        output.push_str("(no rows)\n");
        return output;
    }

    output.push_str(&Table::new(rows).to_string());
    output.push('\n');

    output
}

/// Write a text report to disk.
pub fn write_text_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

/// Generate a pretty-printed JSON document.
pub fn generate_json_report<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReasonCountRow;

    fn summary() -> CompensationSummary {
        CompensationSummary {
            compensated_transactions: 3,
            total: 40.0,
            average: Some(40.0 / 3.0),
            median: Some(10.0),
            maximum: Some(20.0),
            minimum: Some(10.0),
        }
    }

    fn reasons() -> Vec<ReasonBreakdown> {
        vec![
            ReasonBreakdown {
                compensation_reason: "Lost".to_string(),
                count: 2,
                total_amount: 30.0,
                avg_amount: 15.0,
                transaction_weight: 200.0 / 3.0,
                amount_weight: 75.0,
            },
            ReasonBreakdown {
                compensation_reason: "Damaged".to_string(),
                count: 1,
                total_amount: 10.0,
                avg_amount: 10.0,
                transaction_weight: 100.0 / 3.0,
                amount_weight: 25.0,
            },
        ]
    }

    #[test]
    fn test_generate_compensation_report() {
        let report = generate_compensation_report(&summary(), &reasons());

        assert!(report.starts_with("Compensation Amounts Summary:\nTotal Compensation Amount: $40.00\n"));
        assert!(report.contains("Average Compensation Amount: $13.33\n"));
        assert!(report.contains("Minimum Compensation Amount: $10.00\n\n\nCompensation by Reason Summary:\n"));
        assert!(report.contains(
            "Lost: Count = 2, Total Amount = $30.00, Average Amount = $15.00, Transaction Weight = 66.67%, Amount Weight = 75.00%\n"
        ));
        assert!(report.contains("Damaged: Count = 1"));
    }

    #[test]
    fn test_compensation_report_without_compensations() {
        let empty = CompensationSummary {
            compensated_transactions: 0,
            total: 0.0,
            average: None,
            median: None,
            maximum: None,
            minimum: None,
        };
        let report = generate_compensation_report(&empty, &[]);
        assert!(report.contains("Total Compensation Amount: $0.00\n"));
        assert!(report.contains("Median Compensation Amount: $nan\n"));
        assert!(report.ends_with("Compensation by Reason Summary:\n"));
    }

    #[test]
    fn test_generate_delivery_summary() {
        let metrics = Metrics {
            avg_delivery_time: Some(4.5),
            on_time_delivery_rate: Some(0.5),
            late_delivery_rate: Some(0.0),
            cs_ticket_rate: Some(0.25),
            compensation_rate: Some(0.125),
            avg_compensation_amount: Some(12.0),
            count_parcels: 8,
            shipment_weight: 800.0,
            resolution_time_avg: None,
        };

        let summary = generate_delivery_summary(&metrics);
        assert_eq!(
            summary,
            "Average Delivery Time: 4.50 business days\n\
             On-Time Delivery Rate: 50.00%\n\
             Compensation Rate: 12.50%\n\
             Average Compensation Amount: 12.00\n\
             Customer Service Ticket Rate: 25.00%\n\
             Average Resolution Time: nan days\n"
        );
    }

    #[test]
    fn test_render_table() {
        let table = render_table("Compensation by Reason", &reasons());
        assert!(table.starts_with("Compensation by Reason\n======================\n"));
        assert!(table.contains("Lost"));
        assert!(table.contains("$15.00"));
        assert!(table.contains("66.67%"));

        let empty = render_table::<ReasonBreakdown>("Empty", &[]);
        assert!(empty.contains("(no rows)"));
    }

    #[test]
    fn test_render_reason_counts() {
        let rows: Vec<ReasonCountRow> = reasons().iter().map(ReasonCountRow::from).collect();
        let table = render_table("Compensation Reasons", &rows);
        assert!(table.contains("Average Amount"));
        assert!(table.contains("$15.00"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&summary()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["compensated_transactions"], 3);
        assert_eq!(parsed["total"], 40.0);
    }
}
