//! Shipment metrics aggregation.
//!
//! This module computes the fixed set of KPIs for any subset of a
//! shipment table. It is a pure function of its input; partitions and
//! scenarios reuse it without sharing state.

use crate::analysis::stats;
use crate::models::{Metrics, ShipmentTable};

/// Delivery-time thresholds applied by the aggregator.
///
/// On-time and late are independent thresholds because the consolidated
/// table and the text summary disagree on what "on time" means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryThresholds {
    /// A parcel is on time when delivered in at most this many business days.
    pub on_time_days: u32,
    /// A parcel is late when delivered in more than this many business days.
    pub late_days: u32,
}

impl DeliveryThresholds {
    pub fn new(on_time_days: u32, late_days: u32) -> Self {
        Self {
            on_time_days,
            late_days,
        }
    }
}

impl Default for DeliveryThresholds {
    fn default() -> Self {
        Self::new(7, 7)
    }
}

/// Compute all metrics for a shipment table.
pub fn compute_metrics(table: &ShipmentTable, thresholds: DeliveryThresholds) -> Metrics {
    let total = table.len();

    let delivery_times: Vec<f64> = table
        .iter()
        .map(|r| r.delivery_time_business_days as f64)
        .collect();
    let on_time = table
        .iter()
        .filter(|r| r.delivery_time_business_days <= thresholds.on_time_days)
        .count();
    let late = table
        .iter()
        .filter(|r| r.delivery_time_business_days > thresholds.late_days)
        .count();
    let tickets = table.iter().filter(|r| r.has_marketplace_cs_ticket).count();

    let amounts: Vec<f64> = table.iter().filter_map(|r| r.total_compensation).collect();
    let resolution_days: Vec<f64> = table
        .iter()
        .filter_map(|r| r.resolution_days())
        .map(|days| days as f64)
        .collect();

    Metrics {
        avg_delivery_time: stats::mean(&delivery_times),
        on_time_delivery_rate: stats::fraction(on_time, total),
        late_delivery_rate: stats::fraction(late, total),
        cs_ticket_rate: stats::fraction(tickets, total),
        compensation_rate: stats::fraction(amounts.len(), total),
        avg_compensation_amount: stats::mean(&amounts),
        count_parcels: total,
        shipment_weight: shipment_weight(total, amounts.len()),
        resolution_time_avg: stats::mean(&resolution_days),
    }
}

/// Total rows per compensated row, times 100. Zero when nothing was compensated.
pub fn shipment_weight(total: usize, compensated: usize) -> f64 {
    if compensated == 0 {
        return 0.0;
    }
    (total as f64 / compensated as f64) * 100.0
}
