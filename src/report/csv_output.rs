//! CSV result files.

use crate::analysis::{MonthDayAverages, ReasonBreakdown, ScenarioProjection};
use crate::models::{PartitionKind, PartitionMetrics};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

/// A row type written by [`write_csv`].
///
/// `HEADERS` must list the serialized field names in order; it is written
/// on its own when there are no rows.
pub trait CsvRecord: Serialize {
    const HEADERS: &'static [&'static str];
}

/// One row of the consolidated route / sortation-center table.
///
/// Rates are percentages here, unlike [`crate::models::Metrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedRow {
    pub avg_delivery_time: Option<f64>,
    pub on_time_delivery_rate: Option<f64>,
    pub late_delivery_rate: Option<f64>,
    pub cs_ticket_rate: Option<f64>,
    pub compensation_rate: Option<f64>,
    pub avg_compensation_amount: Option<f64>,
    pub count_parcels: usize,
    pub shipment_weight: f64,
    pub resolution_time_avg: Option<f64>,
    #[serde(rename = "type")]
    pub kind: PartitionKind,
    pub identifier: String,
}

fn as_percentage(fraction: Option<f64>) -> Option<f64> {
    fraction.map(|f| f * 100.0)
}

impl From<&PartitionMetrics> for ConsolidatedRow {
    fn from(partition: &PartitionMetrics) -> Self {
        let m = &partition.metrics;
        Self {
            avg_delivery_time: m.avg_delivery_time,
            on_time_delivery_rate: as_percentage(m.on_time_delivery_rate),
            late_delivery_rate: as_percentage(m.late_delivery_rate),
            cs_ticket_rate: as_percentage(m.cs_ticket_rate),
            compensation_rate: as_percentage(m.compensation_rate),
            avg_compensation_amount: m.avg_compensation_amount,
            count_parcels: m.count_parcels,
            shipment_weight: m.shipment_weight,
            resolution_time_avg: m.resolution_time_avg,
            kind: partition.kind,
            identifier: partition.identifier.clone(),
        }
    }
}

impl CsvRecord for ConsolidatedRow {
    const HEADERS: &'static [&'static str] = &[
        "avg_delivery_time",
        "on_time_delivery_rate",
        "late_delivery_rate",
        "cs_ticket_rate",
        "compensation_rate",
        "avg_compensation_amount",
        "count_parcels",
        "shipment_weight",
        "resolution_time_avg",
        "type",
        "identifier",
    ];
}

/// Reason frequency row of the lane review.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ReasonCountRow {
    #[tabled(rename = "Reason")]
    pub compensation_reason: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Average Amount", display = "money")]
    pub average_compensation_amount: f64,
}

fn money(value: &f64) -> String {
    format!("${:.2}", value)
}

impl From<&ReasonBreakdown> for ReasonCountRow {
    fn from(reason: &ReasonBreakdown) -> Self {
        Self {
            compensation_reason: reason.compensation_reason.clone(),
            count: reason.count,
            average_compensation_amount: reason.avg_amount,
        }
    }
}

impl CsvRecord for ReasonCountRow {
    const HEADERS: &'static [&'static str] =
        &["compensation_reason", "count", "average_compensation_amount"];
}

impl CsvRecord for MonthDayAverages {
    const HEADERS: &'static [&'static str] =
        &["shipped_date_mmdd", "avg_delivery_time", "avg_compensation_amount"];
}

impl CsvRecord for ScenarioProjection {
    const HEADERS: &'static [&'static str] = &[
        "average_volume_increase_per_day",
        "original_avg_delivery_time",
        "improved_avg_delivery_time",
        "original_total_volume",
        "new_total_volume",
        "original_total_cost",
        "new_cost_per_parcel",
        "volume_increase_percentage",
        "delivery_time_reduction",
        "scenario",
    ];
}

/// Write rows as CSV with a header line, even when there are no rows.
pub fn write_csv<T: CsvRecord>(rows: &[T], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    if rows.is_empty() {
        writer
            .write_record(T::HEADERS)
            .with_context(|| format!("Failed to write header to {}", path.display()))?;
    }

    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}
