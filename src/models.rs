//! Data models for shipment analytics.
//!
//! This module contains the core data structures used throughout
//! the application: shipment records, the shipment table, and the
//! per-partition metrics produced by the aggregator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One parcel's delivery and compensation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    /// Date the parcel was shipped.
    pub shipped_date: NaiveDate,
    /// Date the compensation was issued, if any.
    pub compensated_at_date: Option<NaiveDate>,
    /// Delivery time in business days.
    pub delivery_time_business_days: u32,
    /// Whether a marketplace customer-service ticket was opened.
    pub has_marketplace_cs_ticket: bool,
    /// Compensation amount, absent when the parcel was never compensated.
    pub total_compensation: Option<f64>,
    /// Compensation reason label.
    pub compensation_reason: Option<String>,
    /// Route label (e.g. "IT->FR"); empty when the cell was blank.
    pub route: String,
    /// Origin sortation center code; empty when the cell was blank.
    pub from_sc_code: String,
    /// Destination sortation center code; empty when the cell was blank.
    pub to_sc_code: String,
}

impl ShipmentRecord {
    /// Days between shipment and compensation, when both dates are known.
    pub fn resolution_days(&self) -> Option<i64> {
        self.compensated_at_date
            .map(|compensated| (compensated - self.shipped_date).num_days())
    }

    /// Calendar month-day of the shipment (`MM-DD`), ignoring the year.
    pub fn shipped_month_day(&self) -> String {
        self.shipped_date.format("%m-%d").to_string()
    }

    /// Route label, if one was recorded.
    pub fn route_key(&self) -> Option<&str> {
        Some(self.route.as_str()).filter(|route| !route.is_empty())
    }

    /// Origin and destination codes, if both were recorded.
    pub fn sc_pair(&self) -> Option<(&str, &str)> {
        if self.from_sc_code.is_empty() || self.to_sc_code.is_empty() {
            return None;
        }
        Some((&self.from_sc_code, &self.to_sc_code))
    }

    /// Returns true if a compensation amount is present.
    pub fn is_compensated(&self) -> bool {
        self.total_compensation.is_some()
    }
}

/// An ordered collection of shipment records.
///
/// Duplicates are kept; every analysis treats rows independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipmentTable {
    records: Vec<ShipmentRecord>,
}

impl ShipmentTable {
    pub fn new(records: Vec<ShipmentRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn records(&self) -> &[ShipmentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShipmentRecord> {
        self.records.iter()
    }

    /// Append all records of `other` after the records of `self`.
    pub fn concat(mut self, other: ShipmentTable) -> Self {
        self.records.extend(other.records);
        self
    }

    /// Return a new table holding the records that match `predicate`.
    pub fn filter<F>(&self, predicate: F) -> ShipmentTable
    where
        F: Fn(&ShipmentRecord) -> bool,
    {
        ShipmentTable::new(self.records.iter().filter(|r| predicate(r)).cloned().collect())
    }

    /// Records restricted to one origin/destination lane.
    pub fn lane(&self, from_sc_code: &str, to_sc_code: &str) -> ShipmentTable {
        self.filter(|r| r.from_sc_code == from_sc_code && r.to_sc_code == to_sc_code)
    }

    /// Iterate over records that carry a compensation amount.
    pub fn compensated(&self) -> impl Iterator<Item = &ShipmentRecord> {
        self.records.iter().filter(|r| r.is_compensated())
    }
}

impl FromIterator<ShipmentRecord> for ShipmentTable {
    fn from_iter<I: IntoIterator<Item = ShipmentRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ShipmentTable {
    type Item = &'a ShipmentRecord;
    type IntoIter = std::slice::Iter<'a, ShipmentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Fixed set of KPIs computed over a shipment table.
///
/// Rates are fractions in `[0, 1]`. `None` marks a value with no data
/// behind it (an empty partition, or no compensated rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub avg_delivery_time: Option<f64>,
    pub on_time_delivery_rate: Option<f64>,
    pub late_delivery_rate: Option<f64>,
    pub cs_ticket_rate: Option<f64>,
    pub compensation_rate: Option<f64>,
    pub avg_compensation_amount: Option<f64>,
    pub count_parcels: usize,
    /// Total rows divided by compensated rows, times 100; 0 with no compensated rows.
    pub shipment_weight: f64,
    pub resolution_time_avg: Option<f64>,
}

/// How a consolidated row was partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionKind {
    #[serde(rename = "Route")]
    Route,
    #[serde(rename = "Sortation Center")]
    SortationCenter,
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionKind::Route => write!(f, "Route"),
            PartitionKind::SortationCenter => write!(f, "Sortation Center"),
        }
    }
}

/// Metrics for one partition, tagged with its kind and identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionMetrics {
    pub kind: PartitionKind,
    pub identifier: String,
    pub metrics: Metrics,
}

/// A named daily volume growth rate used by the cost projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario label (e.g. "neutral").
    pub name: String,
    /// Volume increase per day of delivery-time improvement, as a fraction.
    pub daily_rate: f64,
}

impl Scenario {
    pub fn new(name: impl Into<String>, daily_rate: f64) -> Self {
        Self {
            name: name.into(),
            daily_rate,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_resolution_days() {
        let r = compensated_on(record("2024-03-01", 4, Some(10.0)), "2024-03-11");
        assert_eq!(r.resolution_days(), Some(10));

        let uncompensated = record("2024-03-01", 4, None);
        assert_eq!(uncompensated.resolution_days(), None);
    }

    #[test]
    fn test_shipped_month_day_ignores_year() {
        let a = record("2023-01-15", 1, None);
        let b = record("2024-01-15", 1, None);
        assert_eq!(a.shipped_month_day(), "01-15");
        assert_eq!(a.shipped_month_day(), b.shipped_month_day());
    }

    #[test]
    fn test_table_concat_keeps_duplicates() {
        let left = ShipmentTable::new(vec![record("2024-01-01", 2, None)]);
        let right = ShipmentTable::new(vec![record("2024-01-01", 2, None)]);
        let table = left.concat(right);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0], table.records()[1]);
    }

    #[test]
    fn test_lane_filter() {
        let mut other = record("2024-01-02", 3, None);
        other.from_sc_code = "XYZ1".to_string();
        let table = ShipmentTable::new(vec![record("2024-01-01", 2, None), other]);

        let lane = table.lane("LYO1", "PAR1");
        assert_eq!(lane.len(), 1);
        assert_eq!(lane.records()[0].delivery_time_business_days, 2);
    }

    #[test]
    fn test_partition_kind_display() {
        assert_eq!(PartitionKind::Route.to_string(), "Route");
        assert_eq!(PartitionKind::SortationCenter.to_string(), "Sortation Center");
    }
}
