//! Shipment CSV loading.
//!
//! This module reads one or more shipment exports, checks that the
//! expected columns are present, and parses each row into a
//! [`ShipmentRecord`]. Files are concatenated in the order given.
//!
//! Missing columns are fatal unless a [`ColumnFallback`] is supplied,
//! in which case the fallback provides a value for every row.

mod fallback;

pub use fallback::{ColumnFallback, SyntheticFixture};

use crate::models::{ShipmentRecord, ShipmentTable};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Cell values read as "absent", in addition to the empty string.
const MISSING_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Columns of a shipment export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ShippedDate,
    CompensatedAtDate,
    DeliveryTimeBusinessDays,
    HasMarketplaceCsTicket,
    TotalCompensation,
    CompensationReason,
    Route,
    FromScCode,
    ToScCode,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::ShippedDate,
        Column::CompensatedAtDate,
        Column::DeliveryTimeBusinessDays,
        Column::HasMarketplaceCsTicket,
        Column::TotalCompensation,
        Column::CompensationReason,
        Column::Route,
        Column::FromScCode,
        Column::ToScCode,
    ];

    /// Header name in the CSV export.
    pub fn name(&self) -> &'static str {
        match self {
            Column::ShippedDate => "shipped_date",
            Column::CompensatedAtDate => "compensated_at_date",
            Column::DeliveryTimeBusinessDays => "delivery_time_business_days",
            Column::HasMarketplaceCsTicket => "has_marketplace_cs_ticket",
            Column::TotalCompensation => "total_compensation",
            Column::CompensationReason => "compensation_reason",
            Column::Route => "route",
            Column::FromScCode => "from_sc_code",
            Column::ToScCode => "to_sc_code",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors that can occur while loading shipment exports
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: Column },

    #[error("{}, line {line}: invalid {column} value '{value}'", path.display())]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: Column,
        value: String,
    },
}

type Result<T> = core::result::Result<T, LoadError>;

/// Load and concatenate shipment exports; every column must be present.
pub fn load_shipments(paths: &[PathBuf]) -> Result<ShipmentTable> {
    load_with(paths, None)
}

/// Load and concatenate shipment exports, filling missing columns from `fallback`.
pub fn load_shipments_with_fallback(
    paths: &[PathBuf],
    fallback: &dyn ColumnFallback,
) -> Result<ShipmentTable> {
    load_with(paths, Some(fallback))
}

fn load_with(paths: &[PathBuf], fallback: Option<&dyn ColumnFallback>) -> Result<ShipmentTable> {
    let mut table = ShipmentTable::default();

    for path in paths {
        let loaded = load_file(path, fallback, table.len())?;
        info!("Loaded {} shipments from {}", loaded.len(), path.display());
        table = table.concat(loaded);
    }

    Ok(table)
}

/// Where each column lives in a file, if anywhere.
struct ColumnIndex {
    positions: HashMap<Column, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let positions = Column::ALL
            .into_iter()
            .filter_map(|column| {
                headers
                    .iter()
                    .position(|h| h.trim() == column.name())
                    .map(|position| (column, position))
            })
            .collect();
        Self { positions }
    }

    fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    fn missing(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| !self.positions.contains_key(c))
            .collect()
    }
}

/// Cell access for one row, with the fallback filling absent columns.
struct RowCells<'a> {
    path: &'a Path,
    index: &'a ColumnIndex,
    record: &'a StringRecord,
    fallback: Option<&'a dyn ColumnFallback>,
    row: usize,
    line: u64,
}

impl<'a> RowCells<'a> {
    /// Raw cell text, `None` when the cell is absent.
    fn get(&self, column: Column) -> Option<Cow<'a, str>> {
        let value = match self.index.position(column) {
            Some(position) => self.record.get(position).map(Cow::Borrowed),
            None => self
                .fallback
                .and_then(|f| f.placeholder(column, self.row))
                .map(Cow::Owned),
        }?;

        if is_missing(&value) {
            None
        } else {
            Some(value)
        }
    }

    fn invalid(&self, column: Column, value: &str) -> LoadError {
        LoadError::InvalidValue {
            path: self.path.to_path_buf(),
            line: self.line,
            column,
            value: value.to_string(),
        }
    }

    fn required<T>(&self, column: Column, parse: impl Fn(&str) -> Option<T>) -> Result<T> {
        let value = self.get(column).unwrap_or_default();
        parse(value.as_ref()).ok_or_else(|| self.invalid(column, &value))
    }

    fn text(&self, column: Column) -> String {
        self.get(column).map(Cow::into_owned).unwrap_or_default()
    }
}

fn load_file(
    path: &Path,
    fallback: Option<&dyn ColumnFallback>,
    row_offset: usize,
) -> Result<ShipmentTable> {
    let read_error = |source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(read_error)?;

    let index = ColumnIndex::from_headers(reader.headers().map_err(read_error)?);

    for column in index.missing() {
        if fallback.is_none() {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
        warn!(
            "Column '{}' missing from {}; using synthetic placeholders",
            column,
            path.display()
        );
    }

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(read_error)?;
        let cells = RowCells {
            path,
            index: &index,
            record: &record,
            fallback,
            row: row_offset + i,
            line: record.position().map(|p| p.line()).unwrap_or(0),
        };
        records.push(parse_record(&cells)?);
    }

    Ok(ShipmentTable::new(records))
}

fn parse_record(cells: &RowCells<'_>) -> Result<ShipmentRecord> {
    let compensated_at_date = cells.get(Column::CompensatedAtDate).and_then(|value| {
        let parsed = parse_date(&value);
        if parsed.is_none() {
            debug!(
                "{}, line {}: unparseable compensated_at_date '{}', treating as absent",
                cells.path.display(),
                cells.line,
                value
            );
        }
        parsed
    });

    let total_compensation = match cells.get(Column::TotalCompensation) {
        Some(value) => Some(
            value
                .parse::<f64>()
                .map_err(|_| cells.invalid(Column::TotalCompensation, &value))?,
        ),
        None => None,
    };

    Ok(ShipmentRecord {
        shipped_date: cells.required(Column::ShippedDate, parse_date)?,
        compensated_at_date,
        delivery_time_business_days: cells
            .required(Column::DeliveryTimeBusinessDays, parse_business_days)?,
        has_marketplace_cs_ticket: cells.required(Column::HasMarketplaceCsTicket, parse_flag)?,
        total_compensation,
        compensation_reason: cells
            .get(Column::CompensationReason)
            .map(Cow::into_owned),
        route: cells.text(Column::Route),
        from_sc_code: cells.text(Column::FromScCode),
        to_sc_code: cells.text(Column::ToScCode),
    })
}

fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || MISSING_MARKERS.contains(&value)
}

/// Parse a calendar date, discarding any time component.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    // "2024-01-15 08:30:00" or "2024-01-15T08:30:00"
    let date = value.get(..10)?;
    let rest = value.get(10..)?;
    if rest.starts_with(' ') || rest.starts_with('T') {
        return NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
    }
    None
}

/// Parse a 0/1 or true/false flag.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Some(true),
        "0" | "0.0" | "false" => Some(false),
        _ => None,
    }
}

/// Parse a non-negative whole number of business days ("4" or "4.0").
pub fn parse_business_days(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(days) = value.parse::<u32>() {
        return Some(days);
    }
    let days = value.parse::<f64>().ok()?;
    if days >= 0.0 && days.fract() == 0.0 && days <= u32::MAX as f64 {
        Some(days as u32)
    } else {
        None
    }
}
