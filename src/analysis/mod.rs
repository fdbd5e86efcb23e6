//! Analysis modules for shipment statistics.
//!
//! This module provides the metrics aggregator, its partition driver,
//! the cost projection, and the correlation and compensation reductions.

pub mod aggregator;
pub mod correlation;
pub mod partition;
pub mod projection;
pub mod reasons;
pub mod seasonal;
pub mod stats;

pub use aggregator::{compute_metrics, DeliveryThresholds};
pub use correlation::{analyze_correlation, format_coefficient, MonthDayAverages};
pub use partition::consolidate;
pub use projection::{project_all, CostModel, ScenarioProjection};
pub use reasons::{breakdown_by_reason, summarize_amounts, CompensationSummary, ReasonBreakdown};
pub use seasonal::{pivot_by_month_day_and_reason, SeasonalPivot};
