//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.shipstats.toml` files.

use crate::analysis::projection::{default_scenarios, IMPROVEMENT_FACTOR, ORIGINAL_COST_PER_PARCEL};
use crate::analysis::{CostModel, DeliveryThresholds};
use crate::models::Scenario;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".shipstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Delivery-time thresholds.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Cost projection settings.
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Lane review settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

/// Input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Shipment exports, concatenated in this order.
    #[serde(default = "default_files")]
    pub files: Vec<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            files: default_files(),
        }
    }
}

fn default_files() -> Vec<PathBuf> {
    vec![
        PathBuf::from("shipping_data_1.csv"),
        PathBuf::from("shipping_data_2.csv"),
    ]
}

/// Output directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Compensation analysis and lane review outputs.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Delivery performance outputs.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Cost projection CSV.
    #[serde(default = "default_projection_dir")]
    pub projection_dir: PathBuf,

    /// Render PNG charts.
    #[serde(default = "default_true")]
    pub charts: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            results_dir: default_results_dir(),
            projection_dir: default_projection_dir(),
            charts: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_projection_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Delivery-time thresholds, in business days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// On-time threshold for the consolidated route/center table.
    #[serde(default = "default_on_time_days")]
    pub on_time_days: u32,

    /// Parcels slower than this are late.
    #[serde(default = "default_late_days")]
    pub late_days: u32,

    /// On-time threshold for the plain-text delivery summary.
    #[serde(default = "default_summary_on_time_days")]
    pub summary_on_time_days: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            on_time_days: default_on_time_days(),
            late_days: default_late_days(),
            summary_on_time_days: default_summary_on_time_days(),
        }
    }
}

fn default_on_time_days() -> u32 {
    7
}

fn default_late_days() -> u32 {
    7
}

fn default_summary_on_time_days() -> u32 {
    5
}

/// Cost projection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Historical cost of one parcel, in EUR.
    #[serde(default = "default_cost_per_parcel")]
    pub cost_per_parcel: f64,

    /// Improved delivery time as a fraction of the current one.
    #[serde(default = "default_improvement_factor")]
    pub improvement_factor: f64,

    /// Named daily volume growth rates.
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<Scenario>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            cost_per_parcel: default_cost_per_parcel(),
            improvement_factor: default_improvement_factor(),
            scenarios: default_scenarios(),
        }
    }
}

fn default_cost_per_parcel() -> f64 {
    ORIGINAL_COST_PER_PARCEL
}

fn default_improvement_factor() -> f64 {
    IMPROVEMENT_FACTOR
}

/// Lane selected by the review pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_from_sc_code")]
    pub from_sc_code: String,

    #[serde(default = "default_to_sc_code")]
    pub to_sc_code: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            from_sc_code: default_from_sc_code(),
            to_sc_code: default_to_sc_code(),
        }
    }
}

fn default_from_sc_code() -> String {
    "LYO1".to_string()
}

fn default_to_sc_code() -> String {
    "PAR1".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref inputs) = args.input {
            self.input.files = inputs.clone();
        }
        if let Some(ref dir) = args.output_dir {
            self.output.output_dir = dir.clone();
        }
        if let Some(ref dir) = args.results_dir {
            self.output.results_dir = dir.clone();
        }
        if let Some(days) = args.on_time_days {
            self.metrics.on_time_days = days;
        }
        if args.no_charts {
            self.output.charts = false;
        }
    }

    /// Check values that would make the analysis meaningless.
    pub fn validate(&self) -> Result<(), String> {
        if self.input.files.is_empty() {
            return Err("At least one input file is required".to_string());
        }
        if self.projection.scenarios.is_empty() {
            return Err("At least one projection scenario is required".to_string());
        }
        if !(self.projection.improvement_factor > 0.0 && self.projection.improvement_factor <= 1.0) {
            return Err("Improvement factor must be in (0, 1]".to_string());
        }
        if self.projection.cost_per_parcel < 0.0 {
            return Err("Cost per parcel cannot be negative".to_string());
        }
        if let Some(scenario) = self
            .projection
            .scenarios
            .iter()
            .find(|s| s.daily_rate.is_nan() || s.daily_rate < 0.0)
        {
            return Err(format!(
                "Scenario '{}' has a negative daily rate: {}",
                scenario.name, scenario.daily_rate
            ));
        }
        Ok(())
    }

    /// Thresholds for the consolidated route/center table.
    pub fn consolidated_thresholds(&self) -> DeliveryThresholds {
        DeliveryThresholds::new(self.metrics.on_time_days, self.metrics.late_days)
    }

    /// Thresholds for the plain-text delivery summary.
    pub fn summary_thresholds(&self) -> DeliveryThresholds {
        DeliveryThresholds::new(self.metrics.summary_on_time_days, self.metrics.late_days)
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel {
            cost_per_parcel: self.projection.cost_per_parcel,
            improvement_factor: self.projection.improvement_factor,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.files.len(), 2);
        assert_eq!(config.metrics.on_time_days, 7);
        assert_eq!(config.metrics.summary_on_time_days, 5);
        assert_eq!(config.projection.cost_per_parcel, 6.81);
        assert_eq!(config.projection.scenarios.len(), 3);
        assert_eq!(config.review.from_sc_code, "LYO1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[input]
files = ["march.csv"]

[metrics]
on_time_days = 5

[projection]
cost_per_parcel = 7.5

[[projection.scenarios]]
name = "flat"
daily_rate = 0.0

[review]
from_sc_code = "MIL1"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.files, vec![PathBuf::from("march.csv")]);
        assert_eq!(config.metrics.on_time_days, 5);
        assert_eq!(config.metrics.late_days, 7);
        assert_eq!(config.projection.cost_per_parcel, 7.5);
        assert_eq!(config.projection.improvement_factor, 0.90);
        assert_eq!(config.projection.scenarios, vec![Scenario::new("flat", 0.0)]);
        assert_eq!(config.review.from_sc_code, "MIL1");
        assert_eq!(config.review.to_sc_code, "PAR1");
        assert_eq!(config.output.results_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_default_toml_round_trips() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[metrics]"));
        assert!(toml_str.contains("[[projection.scenarios]]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.projection.scenarios, default_scenarios());
        assert_eq!(parsed.output.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_validate_rejects_bad_projection() {
        let mut config = Config::default();
        config.projection.improvement_factor = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.projection.scenarios.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_daily_rate() {
        let mut config = Config::default();
        config.projection.scenarios.push(Scenario::new("shrinking", -0.2));
        let err = config.validate().unwrap_err();
        assert!(err.contains("shrinking"));

        let mut config = Config::default();
        config.projection.scenarios = vec![Scenario::new("flat", 0.0)];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_thresholds() {
        let config = Config::default();
        assert_eq!(config.consolidated_thresholds(), DeliveryThresholds::new(7, 7));
        assert_eq!(config.summary_thresholds(), DeliveryThresholds::new(5, 7));
    }
}
