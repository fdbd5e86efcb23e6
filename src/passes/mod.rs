//! Analysis passes.
//!
//! Each pass loads the configured inputs itself, computes its results
//! and writes them under its own output directory. Passes share no
//! state, so a failed load in one never feeds another.

pub mod compensation;
pub mod delivery;
pub mod projection;
pub mod review;

use crate::charts::ChartError;
use crate::cli::{OutputFormat, Pass};
use crate::config::Config;
use crate::loader::{self, SyntheticFixture};
use crate::models::ShipmentTable;
use crate::report::generate_json_report;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Settings shared by every pass of one run.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub config: &'a Config,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl<'a> PassContext<'a> {
    pub fn new(config: &'a Config, format: OutputFormat, quiet: bool) -> Self {
        Self {
            config,
            format,
            quiet,
        }
    }

    /// Load the configured inputs; every column must be present.
    pub fn load(&self) -> Result<ShipmentTable> {
        let table = loader::load_shipments(&self.config.input.files)
            .context("Failed to load shipment data")?;
        info!("{} shipments loaded", table.len());
        Ok(table)
    }

    /// Load the configured inputs, synthesizing missing columns.
    pub fn load_with_fixture(&self) -> Result<ShipmentTable> {
        let table =
            loader::load_shipments_with_fallback(&self.config.input.files, &SyntheticFixture)
                .context("Failed to load shipment data")?;
        info!("{} shipments loaded", table.len());
        Ok(table)
    }

    /// Spinner shown while a pass computes; hidden in quiet mode.
    pub fn spinner(&self, message: &str) -> Spinner {
        if self.quiet {
            return Spinner(ProgressBar::hidden());
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Spinner(pb)
    }

    /// Render a chart unless charts are disabled. Chart failures are
    /// logged and never fail the pass.
    pub fn render_chart<F>(&self, path: &Path, draw: F)
    where
        F: FnOnce(&Path) -> core::result::Result<(), ChartError>,
    {
        if !self.config.output.charts {
            debug!("Charts disabled, skipping {}", path.display());
            return;
        }

        match draw(path) {
            Ok(()) => info!("Chart saved to {}", path.display()),
            Err(e) => warn!("Chart {} not rendered: {}", path.display(), e),
        }
    }

    /// Print console output in the selected format.
    pub fn emit<T: Serialize>(&self, text: impl FnOnce() -> String, json: &T) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        match self.format {
            OutputFormat::Text => println!("{}", text()),
            OutputFormat::Json => println!("{}", generate_json_report(json)?),
        }
        Ok(())
    }
}

/// Progress spinner that clears itself when dropped, including when a
/// pass returns early with an error.
#[derive(Debug)]
pub struct Spinner(ProgressBar);

impl Spinner {
    /// Clear the spinner once the pass is done.
    pub fn finish(self) {}
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

/// Create an output directory if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}

/// Run one pass.
pub fn run(pass: Pass, ctx: &PassContext<'_>) -> Result<()> {
    info!("Running {} pass", pass);

    match pass {
        Pass::Compensation => compensation::run(ctx),
        Pass::Delivery => delivery::run(ctx),
        Pass::Projection => projection::run(ctx),
        Pass::Review => review::run(ctx),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    pub const HEADER: &str = "shipped_date,compensated_at_date,delivery_time_business_days,has_marketplace_cs_ticket,total_compensation,compensation_reason,route,from_sc_code,to_sc_code";

    /// A config whose inputs and outputs all live under `dir`.
    pub fn config_in(dir: &TempDir, rows: &[&str]) -> Config {
        let input = dir.path().join("shipments.csv");
        let mut content = format!("{HEADER}\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        std::fs::write(&input, content).unwrap();

        let mut config = Config::default();
        config.input.files = vec![input];
        config.output.output_dir = dir.path().join("output");
        config.output.results_dir = dir.path().join("results");
        config.output.projection_dir = dir.path().to_path_buf();
        config.output.charts = false;
        config
    }

    pub fn sample_rows() -> Vec<&'static str> {
        vec![
            "2023-01-15,2023-01-20,3,1,10.0,Lost,IT->FR,LYO1,PAR1",
            "2024-01-15,,5,0,,,IT->FR,LYO1,PAR1",
            "2024-01-16,2024-01-18,8,0,20.0,Lost,FR->IT,PAR1,LYO1",
            "2024-01-17,2024-01-27,4,1,10.0,Damaged,IT->FR,LYO1,PAR1",
        ]
    }

    pub fn quiet(config: &Config) -> PassContext<'_> {
        PassContext::new(config, OutputFormat::Text, true)
    }

    pub fn read(path: PathBuf) -> String {
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("{} not readable: {e}", path.display()))
    }
}
