//! What-if cost-per-parcel projection.
//!
//! Assumes a fixed relative improvement in average delivery time and
//! converts the time saved into extra volume using a per-scenario daily
//! growth rate. The formula chain is deterministic and evaluated in a
//! fixed order so results reproduce exactly.

use crate::analysis::stats;
use crate::models::{Scenario, ShipmentTable};
use serde::Serialize;
use tabled::Tabled;

/// Historical cost of shipping one parcel, in EUR.
pub const ORIGINAL_COST_PER_PARCEL: f64 = 6.81;

/// Improved delivery time as a fraction of the current one.
pub const IMPROVEMENT_FACTOR: f64 = 0.90;

/// Cost model constants shared by all scenarios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub cost_per_parcel: f64,
    pub improvement_factor: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            cost_per_parcel: ORIGINAL_COST_PER_PARCEL,
            improvement_factor: IMPROVEMENT_FACTOR,
        }
    }
}

/// The pessimistic, neutral and optimistic daily growth rates.
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("pessimistic", 0.01),
        Scenario::new("neutral", 0.05),
        Scenario::new("optimistic", 0.08),
    ]
}

/// Projection results for one scenario. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ScenarioProjection {
    #[tabled(rename = "Daily Rate")]
    pub average_volume_increase_per_day: f64,
    #[tabled(rename = "Avg Delivery", display = "two_decimals")]
    pub original_avg_delivery_time: f64,
    #[tabled(rename = "Improved", display = "two_decimals")]
    pub improved_avg_delivery_time: f64,
    #[tabled(rename = "Volume")]
    pub original_total_volume: usize,
    #[tabled(rename = "New Volume", display = "two_decimals")]
    pub new_total_volume: f64,
    #[tabled(rename = "Total Cost", display = "two_decimals")]
    pub original_total_cost: f64,
    #[tabled(rename = "New Cost/Parcel", display = "four_decimals")]
    pub new_cost_per_parcel: f64,
    #[tabled(rename = "Volume +%", display = "two_decimals")]
    pub volume_increase_percentage: f64,
    #[tabled(rename = "Reduction", display = "four_decimals")]
    pub delivery_time_reduction: f64,
    #[tabled(rename = "Scenario")]
    pub scenario: String,
}

fn two_decimals(value: &f64) -> String {
    format!("{:.2}", value)
}

fn four_decimals(value: &f64) -> String {
    format!("{:.4}", value)
}

/// Project one scenario. Returns `None` for an empty table, which has
/// no average delivery time to improve on.
pub fn project_scenario(
    table: &ShipmentTable,
    scenario: &Scenario,
    model: CostModel,
) -> Option<ScenarioProjection> {
    let delivery_times: Vec<f64> = table
        .iter()
        .map(|r| r.delivery_time_business_days as f64)
        .collect();
    let avg_delivery_time = stats::mean(&delivery_times)?;
    let total_shipments = table.len();

    let improved_avg_delivery_time = avg_delivery_time * model.improvement_factor;
    let delivery_time_reduction = avg_delivery_time - improved_avg_delivery_time;

    let volume_increase_percentage = delivery_time_reduction * scenario.daily_rate * 100.0;
    let new_total_volume = projected_volume(total_shipments, volume_increase_percentage);

    let original_total_cost = total_shipments as f64 * model.cost_per_parcel;
    let new_cost_per_parcel = original_total_cost / new_total_volume;

    Some(ScenarioProjection {
        average_volume_increase_per_day: scenario.daily_rate,
        original_avg_delivery_time: avg_delivery_time,
        improved_avg_delivery_time,
        original_total_volume: total_shipments,
        new_total_volume,
        original_total_cost,
        new_cost_per_parcel,
        volume_increase_percentage,
        delivery_time_reduction,
        scenario: scenario.name.clone(),
    })
}

/// Volume after growing `original` by `increase_percentage` percent.
pub fn projected_volume(original: usize, increase_percentage: f64) -> f64 {
    original as f64 * (1.0 + (increase_percentage / 100.0))
}

/// Project every scenario in order. `None` if the table is empty.
pub fn project_all(
    table: &ShipmentTable,
    scenarios: &[Scenario],
    model: CostModel,
) -> Option<Vec<ScenarioProjection>> {
    scenarios
        .iter()
        .map(|scenario| project_scenario(table, scenario, model))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::*;

    fn table() -> ShipmentTable {
        ShipmentTable::new(vec![
            record("2024-01-01", 4, None),
            record("2024-01-02", 6, Some(12.0)),
            record("2024-01-03", 5, None),
            record("2024-01-04", 5, None),
        ])
    }

    #[test]
    fn test_neutral_scenario_formula_chain() {
        let table = table();
        let neutral = Scenario::new("neutral", 0.05);
        let p = project_scenario(&table, &neutral, CostModel::default()).unwrap();

        assert_eq!(p.original_avg_delivery_time, 5.0);
        assert_eq!(p.improved_avg_delivery_time, 5.0 * 0.90);
        assert_eq!(p.delivery_time_reduction, 5.0 - 5.0 * 0.90);
        assert_eq!(p.original_total_volume, 4);
        assert_eq!(p.original_total_cost, 4.0 * 6.81);
        assert_eq!(p.new_cost_per_parcel, p.original_total_cost / p.new_total_volume);

        // Recomputing the volume from the stored percentage matches exactly.
        assert_eq!(
            projected_volume(p.original_total_volume, p.volume_increase_percentage),
            p.new_total_volume
        );
        assert!((p.volume_increase_percentage - 2.5).abs() < 1e-9);
        assert!((p.new_total_volume - 4.1).abs() < 1e-9);
    }

    #[test]
    fn test_project_all_orders_default_scenarios() {
        let projections = project_all(&table(), &default_scenarios(), CostModel::default()).unwrap();
        let names: Vec<_> = projections.iter().map(|p| p.scenario.as_str()).collect();
        assert_eq!(names, vec!["pessimistic", "neutral", "optimistic"]);

        // Faster growth means cheaper parcels.
        assert!(projections[0].new_cost_per_parcel > projections[1].new_cost_per_parcel);
        assert!(projections[1].new_cost_per_parcel > projections[2].new_cost_per_parcel);
        assert!(projections[0].new_cost_per_parcel < ORIGINAL_COST_PER_PARCEL);
    }

    #[test]
    fn test_empty_table_has_no_projection() {
        assert!(project_all(&ShipmentTable::default(), &default_scenarios(), CostModel::default()).is_none());
    }

    #[test]
    fn test_custom_cost_model() {
        let model = CostModel {
            cost_per_parcel: 10.0,
            improvement_factor: 0.5,
        };
        let p = project_scenario(&table(), &Scenario::new("steep", 0.1), model).unwrap();
        assert_eq!(p.improved_avg_delivery_time, 2.5);
        assert_eq!(p.original_total_cost, 40.0);
        assert!((p.volume_increase_percentage - 25.0).abs() < 1e-9);
        assert!((p.new_cost_per_parcel - 8.0).abs() < 1e-9);
    }
}
