//! Month-day reduction and delivery/compensation correlation.

use crate::analysis::stats;
use crate::models::ShipmentTable;
use serde::Serialize;
use std::collections::BTreeMap;

/// Averages for one calendar month-day across all years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthDayAverages {
    /// Month-day key (`MM-DD`).
    pub shipped_date_mmdd: String,
    pub avg_delivery_time: f64,
    pub avg_compensation_amount: f64,
}

/// Result of the correlation analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationAnalysis {
    /// Reduced table, sorted by month-day.
    pub by_month_day: Vec<MonthDayAverages>,
    /// Pearson coefficient between the two average columns.
    pub coefficient: Option<f64>,
}

#[derive(Default)]
struct MonthDayAccumulator {
    delivery_times: Vec<f64>,
    amounts: Vec<f64>,
}

/// Reduce a table to one row per month-day.
///
/// Days with no compensated shipment have no average amount and are dropped.
pub fn reduce_by_month_day(table: &ShipmentTable) -> Vec<MonthDayAverages> {
    let mut days: BTreeMap<String, MonthDayAccumulator> = BTreeMap::new();

    for record in table {
        let day = days.entry(record.shipped_month_day()).or_default();
        day.delivery_times
            .push(record.delivery_time_business_days as f64);
        if let Some(amount) = record.total_compensation {
            day.amounts.push(amount);
        }
    }

    days.into_iter()
        .filter_map(|(shipped_date_mmdd, day)| {
            Some(MonthDayAverages {
                avg_delivery_time: stats::mean(&day.delivery_times)?,
                avg_compensation_amount: stats::mean(&day.amounts)?,
                shipped_date_mmdd,
            })
        })
        .collect()
}

/// Reduce by month-day and correlate average delivery time with average compensation.
pub fn analyze_correlation(table: &ShipmentTable) -> CorrelationAnalysis {
    let by_month_day = reduce_by_month_day(table);

    let delivery: Vec<f64> = by_month_day.iter().map(|d| d.avg_delivery_time).collect();
    let compensation: Vec<f64> = by_month_day
        .iter()
        .map(|d| d.avg_compensation_amount)
        .collect();

    CorrelationAnalysis {
        coefficient: stats::pearson(&delivery, &compensation),
        by_month_day,
    }
}

/// Format a coefficient with two decimals, or `nan` when undefined.
pub fn format_coefficient(coefficient: Option<f64>) -> String {
    match coefficient {
        Some(value) => format!("{:.2}", value),
        None => "nan".to_string(),
    }
}
