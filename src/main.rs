//! shipstats - descriptive statistics over shipment exports
//!
//! A CLI tool that loads shipment CSV exports and writes compensation
//! summaries, delivery KPIs, correlation tables, cost projections and
//! charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, missing column, config, etc.)

mod analysis;
mod charts;
mod cli;
mod config;
mod loader;
mod models;
mod passes;
mod report;

use anyhow::{anyhow, Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use passes::PassContext;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("shipstats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .shipstats.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize inputs, output directories, thresholds and scenarios.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the selected passes in order, stopping at the first failure.
fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate().map_err(|e| anyhow!(e))?;

    let selected = args.effective_passes();
    if !args.quiet {
        println!("📂 Inputs:");
        for file in &config.input.files {
            println!("   {}", file.display());
        }
    }

    let ctx = PassContext::new(&config, args.format, args.quiet);
    for pass in &selected {
        if !args.quiet {
            println!("\n▶ Running {} pass", pass);
        }
        passes::run(*pass, &ctx).with_context(|| format!("The {} pass failed", pass))?;
    }

    let duration = start_time.elapsed().as_secs_f64();
    info!("{} passes completed in {:.1}s", selected.len(), duration);
    if !args.quiet {
        println!("\n✅ Analysis complete in {:.1}s", duration);
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
