//! Placeholder values for columns missing from an export.
//!
//! Used only by the lane review, which must still run against partial
//! demo exports. Strict loading never consults a fallback.

use super::Column;
use chrono::{Duration, NaiveDate};

/// Supplies a cell value for a column that the export does not contain.
pub trait ColumnFallback {
    /// Value for `column` on the `row`-th record (0-based, across all
    /// loaded files). `None` leaves the cell absent.
    fn placeholder(&self, column: Column, row: usize) -> Option<String>;
}

/// Deterministic synthetic data: alternating labels, a January 2021 date
/// cycle and sequential numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticFixture;

impl SyntheticFixture {
    const DATE_CYCLE_DAYS: usize = 31;

    fn alternate(row: usize, even: &str, odd: &str) -> String {
        let label = if row % 2 == 0 { even } else { odd };
        label.to_string()
    }

    fn shipped_date(row: usize) -> Option<String> {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1)?;
        let offset = (row % Self::DATE_CYCLE_DAYS) as i64;
        Some((start + Duration::days(offset)).format("%Y-%m-%d").to_string())
    }
}

impl ColumnFallback for SyntheticFixture {
    fn placeholder(&self, column: Column, row: usize) -> Option<String> {
        match column {
            Column::Route => Some(Self::alternate(row, "IT->FR", "FR->IT")),
            Column::FromScCode => Some(Self::alternate(row, "LYO1", "XYZ1")),
            Column::ToScCode => Some(Self::alternate(row, "PAR1", "ABC1")),
            Column::DeliveryTimeBusinessDays => Some(row.to_string()),
            Column::TotalCompensation => Some((100 + row).to_string()),
            Column::ShippedDate => Self::shipped_date(row),
            Column::CompensationReason => Some(Self::alternate(row, "Reason A", "Reason B")),
            Column::HasMarketplaceCsTicket => Some("0".to_string()),
            Column::CompensatedAtDate => None,
        }
    }
}
