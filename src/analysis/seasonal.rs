//! Seasonal compensation pivot (month-day by reason).

use crate::models::ShipmentTable;
use std::collections::{BTreeMap, BTreeSet};

/// Total compensation per month-day and reason.
///
/// `series[r][d]` is the amount for `reasons[r]` on `month_days[d]`;
/// missing combinations are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonalPivot {
    pub month_days: Vec<String>,
    pub reasons: Vec<String>,
    pub series: Vec<Vec<f64>>,
}

impl SeasonalPivot {
    pub fn is_empty(&self) -> bool {
        self.month_days.is_empty() || self.reasons.is_empty()
    }

    /// Running totals across reasons, for drawing stacked areas.
    ///
    /// The last layer is the total over all reasons for each month-day.
    pub fn stacked(&self) -> Vec<Vec<f64>> {
        let mut running = vec![0.0; self.month_days.len()];
        self.series
            .iter()
            .map(|values| {
                for (total, value) in running.iter_mut().zip(values) {
                    *total += value;
                }
                running.clone()
            })
            .collect()
    }
}

/// Pivot compensation amounts by shipment month-day and reason.
///
/// Rows without a reason are skipped.
pub fn pivot_by_month_day_and_reason(table: &ShipmentTable) -> SeasonalPivot {
    let mut totals: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut month_days: BTreeSet<String> = BTreeSet::new();
    let mut reasons: BTreeSet<String> = BTreeSet::new();

    for record in table {
        let Some(reason) = record.compensation_reason.as_ref() else {
            continue;
        };
        let day = record.shipped_month_day();
        month_days.insert(day.clone());
        reasons.insert(reason.clone());
        *totals.entry((day, reason.clone())).or_insert(0.0) +=
            record.total_compensation.unwrap_or(0.0);
    }

    let month_days: Vec<String> = month_days.into_iter().collect();
    let reasons: Vec<String> = reasons.into_iter().collect();
    let series = reasons
        .iter()
        .map(|reason| {
            month_days
                .iter()
                .map(|day| {
                    totals
                        .get(&(day.clone(), reason.clone()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect();

    SeasonalPivot {
        month_days,
        reasons,
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::*;

    #[test]
    fn test_pivot_fills_missing_with_zero() {
        let table = ShipmentTable::new(vec![
            with_reason(record("2023-06-01", 3, Some(10.0)), "Lost"),
            with_reason(record("2024-06-01", 3, Some(5.0)), "Lost"),
            with_reason(record("2024-06-02", 3, Some(7.0)), "Damaged"),
            record("2024-06-03", 3, None),
        ]);

        let pivot = pivot_by_month_day_and_reason(&table);
        assert_eq!(pivot.month_days, vec!["06-01", "06-02"]);
        assert_eq!(pivot.reasons, vec!["Damaged", "Lost"]);
        assert_eq!(pivot.series, vec![vec![0.0, 7.0], vec![15.0, 0.0]]);
    }

    #[test]
    fn test_stacked_layers_accumulate() {
        let pivot = SeasonalPivot {
            month_days: vec!["01-01".to_string(), "01-02".to_string()],
            reasons: vec!["A".to_string(), "B".to_string()],
            series: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        };
        assert_eq!(pivot.stacked(), vec![vec![1.0, 2.0], vec![4.0, 6.0]]);
    }

    #[test]
    fn test_empty_pivot() {
        let pivot = pivot_by_month_day_and_reason(&ShipmentTable::default());
        assert!(pivot.is_empty());
        assert!(pivot.stacked().is_empty());
    }
}
