//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// shipstats - descriptive statistics over shipment exports
///
/// Reads one or more shipment CSV exports and writes KPI tables,
/// text summaries, cost projections and charts.
///
/// Examples:
///   shipstats
///   shipstats --input march.csv,april.csv --passes delivery,projection
///   shipstats --no-charts --format json
///   shipstats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Shipment CSV exports to analyze (comma-separated)
    ///
    /// Files are concatenated in the order given. Defaults to
    /// shipping_data_1.csv,shipping_data_2.csv or the config file's list.
    #[arg(short, long, value_name = "FILES", value_delimiter = ',')]
    pub input: Option<Vec<PathBuf>>,

    /// Analysis passes to run (comma-separated)
    ///
    /// Runs all passes when omitted. Values: compensation, delivery, projection, review
    #[arg(short, long, value_name = "PASSES", value_delimiter = ',')]
    pub passes: Option<Vec<Pass>>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .shipstats.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "SHIPSTATS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for compensation and lane review outputs
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory for delivery performance outputs
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// On-time threshold in business days for the consolidated table
    #[arg(long, value_name = "DAYS")]
    pub on_time_days: Option<u32>,

    /// Skip PNG chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Console output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .shipstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Console output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables and summaries (default)
    #[default]
    Text,
    /// One JSON document per pass
    Json,
}

/// An independent analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum Pass {
    /// Compensation amounts, per-reason breakdown, seasonal chart
    Compensation,
    /// Consolidated KPIs, seasonal and correlation charts, text summary
    Delivery,
    /// Cost-per-parcel scenarios
    Projection,
    /// Single-lane correlation and reason review
    Review,
}

impl Pass {
    pub const ALL: [Pass; 4] = [
        Pass::Compensation,
        Pass::Delivery,
        Pass::Projection,
        Pass::Review,
    ];
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::Compensation => "compensation",
            Pass::Delivery => "delivery",
            Pass::Projection => "projection",
            Pass::Review => "review",
        };
        write!(f, "{}", name)
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref inputs) = self.input {
            if inputs.is_empty() {
                return Err("--input needs at least one file".to_string());
            }
        }

        if let Some(ref passes) = self.passes {
            if passes.is_empty() {
                return Err("--passes needs at least one pass".to_string());
            }
        }

        Ok(())
    }

    /// Passes to run, deduplicated, in canonical order.
    pub fn effective_passes(&self) -> Vec<Pass> {
        match self.passes {
            Some(ref passes) => {
                let mut passes = passes.clone();
                passes.sort();
                passes.dedup();
                passes
            }
            None => Pass::ALL.to_vec(),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
