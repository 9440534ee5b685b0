//! Satellite scene tiler.
//!
//! Cuts an area of interest out of every usable scene in a dataset
//! directory and writes one tone-mapped tile per accepted scene, with its
//! adjusted camera metadata and region record.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{load_config, LoggingConfig, TilerConfig};
use tile_cutter::TileCutter;

#[derive(Parser, Debug)]
#[command(name = "tiler")]
#[command(about = "Cut an area of interest out of a satellite scene archive")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/tiler.yaml", env = "TILER_CONFIG")]
    config: PathBuf,

    /// Override the dataset directory
    #[arg(long)]
    dataset_dir: Option<PathBuf>,

    /// Override the output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Override the maximum accepted cloud cover
    #[arg(long)]
    cloud_threshold: Option<f64>,

    /// Override the minimum accepted overlap ratio
    #[arg(long)]
    coverage_threshold: Option<f64>,

    /// Produce tiles one at a time
    #[arg(long)]
    serial: bool,

    /// Only report which scenes would be cut
    #[arg(long)]
    dry_run: bool,

    /// Log level, overriding the configuration file
    #[arg(long, env = "TILER_LOG_LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, &args)?;

    init_tracing(&config.logging);

    info!(
        config = %args.config.display(),
        dataset_dir = %config.dataset_dir.display(),
        out_dir = %config.out_dir.display(),
        "Starting tiler"
    );

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.out_dir))?;

    let region = config.aoi.to_region()?;
    let cutter = TileCutter::open(
        &config.dataset_dir,
        &config.out_dir,
        &config.dataset,
        config.cutter.clone(),
    )
    .context("Failed to prepare dataset")?;

    if args.dry_run {
        let plan = cutter.plan_region(&region).context("Failed to plan region")?;
        let counts = plan.counts();
        info!(
            accepted = counts.accepted,
            rejected_cloudy = counts.rejected_cloudy,
            rejected_low_coverage = counts.rejected_low_coverage,
            "Dry run complete"
        );
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let report = cutter
        .cut_aoi(&region)
        .with_context(|| format!("Failed to cut region {}", region))?;

    if report.cancelled {
        warn!(aoi = %region, "Run cancelled; no tiles written");
    } else {
        info!(
            tiles = report.tiles.len(),
            out_dir = %config.out_dir.display(),
            "Tiling complete"
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Fold command-line overrides into the loaded configuration.
fn apply_overrides(config: &mut TilerConfig, args: &Args) -> Result<()> {
    if let Some(dir) = &args.dataset_dir {
        config.dataset_dir = dir.clone();
    }
    if let Some(dir) = &args.out_dir {
        config.out_dir = dir.clone();
    }
    if let Some(threshold) = args.cloud_threshold {
        config.cutter.cloud_threshold = threshold;
    }
    if let Some(threshold) = args.coverage_threshold {
        config.cutter.coverage_threshold = threshold;
    }
    if args.serial {
        config.cutter.parallel = false;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.to_lowercase();
    }

    config::validate_config(config).context("Invalid command-line override")
}

fn init_tracing(logging: &LoggingConfig) {
    // RUST_LOG wins over the configured level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "pretty" => builder.pretty().init(),
        _ => builder.json().init(),
    }
}
