//! Partitioned metrics consolidation.
//!
//! Runs the aggregator once per route and once per sortation-center
//! pair, and assembles the tagged results into one ordered table.

use crate::analysis::aggregator::{compute_metrics, DeliveryThresholds};
use crate::models::{PartitionKind, PartitionMetrics, ShipmentRecord, ShipmentTable};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Group records by route, keeping routes in order of first appearance.
/// Records without a route belong to no group.
pub fn group_by_route(table: &ShipmentTable) -> Vec<(String, ShipmentTable)> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<ShipmentRecord>> = HashMap::new();

    for record in table {
        let Some(route) = record.route_key() else {
            continue;
        };
        let bucket = grouped.entry(route.to_string()).or_insert_with(|| {
            order.push(route.to_string());
            Vec::new()
        });
        bucket.push(record.clone());
    }

    order
        .into_iter()
        .map(|route| {
            let records = grouped.remove(&route).unwrap_or_default();
            (route, ShipmentTable::new(records))
        })
        .collect()
}

/// Group records by (origin, destination) sortation center, sorted by key.
/// Records missing either code belong to no group.
pub fn group_by_sc_pair(table: &ShipmentTable) -> BTreeMap<(String, String), ShipmentTable> {
    let mut grouped: BTreeMap<(String, String), Vec<ShipmentRecord>> = BTreeMap::new();

    for record in table {
        let Some((from_sc, to_sc)) = record.sc_pair() else {
            continue;
        };
        grouped
            .entry((from_sc.to_string(), to_sc.to_string()))
            .or_default()
            .push(record.clone());
    }

    grouped
        .into_iter()
        .map(|(key, records)| (key, ShipmentTable::new(records)))
        .collect()
}

/// Identifier used for a sortation-center pair.
pub fn sc_pair_identifier(from_sc_code: &str, to_sc_code: &str) -> String {
    format!("{} -> {}", from_sc_code, to_sc_code)
}

/// Compute metrics per route, then per sortation-center pair.
pub fn consolidate(table: &ShipmentTable, thresholds: DeliveryThresholds) -> Vec<PartitionMetrics> {
    let mut consolidated = Vec::new();

    for (route, routed) in group_by_route(table) {
        debug!("Route {}: {} shipments", route, routed.len());
        consolidated.push(PartitionMetrics {
            kind: PartitionKind::Route,
            identifier: route,
            metrics: compute_metrics(&routed, thresholds),
        });
    }

    for ((from_sc, to_sc), lane) in group_by_sc_pair(table) {
        let identifier = sc_pair_identifier(&from_sc, &to_sc);
        debug!("Sortation center {}: {} shipments", identifier, lane.len());
        consolidated.push(PartitionMetrics {
            kind: PartitionKind::SortationCenter,
            identifier,
            metrics: compute_metrics(&lane, thresholds),
        });
    }

    consolidated
}
