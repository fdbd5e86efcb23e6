//! Compensation amount summary and per-reason breakdown.

use crate::analysis::stats;
use crate::models::ShipmentTable;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// Summary of compensation amounts over compensated shipments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompensationSummary {
    pub compensated_transactions: usize,
    /// Sum of amounts; zero when nothing was compensated.
    pub total: f64,
    pub average: Option<f64>,
    pub median: Option<f64>,
    pub maximum: Option<f64>,
    pub minimum: Option<f64>,
}

/// Breakdown for one compensation reason.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ReasonBreakdown {
    #[tabled(rename = "Reason")]
    pub compensation_reason: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Total Amount", display = "money")]
    pub total_amount: f64,
    #[tabled(rename = "Average Amount", display = "money")]
    pub avg_amount: f64,
    /// Share of compensated transactions, in percent.
    #[tabled(rename = "Transaction Weight", display = "percent")]
    pub transaction_weight: f64,
    /// Share of the total compensated amount, in percent.
    #[tabled(rename = "Amount Weight", display = "percent")]
    pub amount_weight: f64,
}

fn money(value: &f64) -> String {
    format!("${:.2}", value)
}

fn percent(value: &f64) -> String {
    format!("{:.2}%", value)
}

/// Summarize the compensation amounts of a table.
pub fn summarize_amounts(table: &ShipmentTable) -> CompensationSummary {
    let amounts: Vec<f64> = table.iter().filter_map(|r| r.total_compensation).collect();

    CompensationSummary {
        compensated_transactions: amounts.len(),
        total: amounts.iter().sum(),
        average: stats::mean(&amounts),
        median: stats::median(&amounts),
        maximum: stats::max(&amounts),
        minimum: stats::min(&amounts),
    }
}

/// Group compensated shipments by reason, most common reason first.
///
/// Weights use independent denominators: transaction weight is relative to
/// all compensated transactions, amount weight to the total compensated amount.
pub fn breakdown_by_reason(table: &ShipmentTable) -> Vec<ReasonBreakdown> {
    let compensated: Vec<(f64, Option<&str>)> = table
        .compensated()
        .filter_map(|r| {
            r.total_compensation
                .map(|amount| (amount, r.compensation_reason.as_deref()))
        })
        .collect();

    let total_transactions = compensated.len();
    let total_amount: f64 = compensated.iter().map(|(amount, _)| amount).sum();

    let mut by_reason: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (amount, reason) in &compensated {
        if let Some(reason) = reason {
            by_reason.entry(*reason).or_default().push(*amount);
        }
    }

    let mut breakdown: Vec<ReasonBreakdown> = by_reason
        .into_iter()
        .map(|(reason, amounts)| {
            let count = amounts.len();
            let reason_total: f64 = amounts.iter().sum();
            ReasonBreakdown {
                compensation_reason: reason.to_string(),
                count,
                total_amount: reason_total,
                avg_amount: reason_total / count as f64,
                transaction_weight: weight(count as f64, total_transactions as f64),
                amount_weight: weight(reason_total, total_amount),
            }
        })
        .collect();

    // Stable sort keeps alphabetical order among equal counts.
    breakdown.sort_by_key(|b| std::cmp::Reverse(b.count));
    breakdown
}

fn weight(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}
