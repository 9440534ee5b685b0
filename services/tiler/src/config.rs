//! Tiler configuration.
//!
//! Loaded from a single YAML file. Supports environment variable
//! substitution using `${VAR}` and `${VAR:-default}` syntax.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use scene_metadata::DatasetOptions;
use tile_common::{GeographicRegion, UtmZone};
use tile_cutter::CutterConfig;

// ============================================================================
// Configuration Types
// ============================================================================

/// Top-level tiler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilerConfig {
    /// Directory holding raw rasters and their XML sidecars
    pub dataset_dir: PathBuf,

    /// Output directory; created if missing
    pub out_dir: PathBuf,

    /// Area of interest, cut as one region
    pub aoi: AoiConfig,

    #[serde(default)]
    pub cutter: CutterConfig,

    #[serde(default)]
    pub dataset: DatasetOptions,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Area of interest given by its UTM corners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AoiConfig {
    pub zone_number: u8,
    pub zone_letter: char,
    pub ul_easting: f64,
    pub ul_northing: f64,
    pub lr_easting: f64,
    pub lr_northing: f64,
}

impl AoiConfig {
    pub fn to_region(&self) -> Result<GeographicRegion> {
        let zone = UtmZone::new(self.zone_number, self.zone_letter)?;
        let region = GeographicRegion::from_corners(
            zone,
            self.ul_easting,
            self.ul_northing,
            self.lr_easting,
            self.lr_northing,
        )?;
        Ok(region)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Load and parse the tiler YAML with environment variable substitution.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TilerConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read tiler config from {:?}", path.as_ref()))?;

    parse_config(&content)
}

/// Parse tiler YAML held in memory.
pub fn parse_config(content: &str) -> Result<TilerConfig> {
    let expanded = expand_env_vars(content)?;

    let config: TilerConfig =
        serde_yaml::from_str(&expanded).with_context(|| "Failed to parse tiler config YAML")?;

    validate_config(&config)?;

    Ok(config)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references line by line.
///
/// Errors name the line and the YAML key the reference belongs to.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());

    for (number, line) in content.split_inclusive('\n').enumerate() {
        let key = line
            .split_once(':')
            .map(|(key, _)| key.trim().trim_start_matches("- "))
            .unwrap_or("");
        let mut rest = line;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                anyhow::bail!(
                    "Unclosed variable substitution on line {} ({}): ${{{}",
                    number + 1,
                    key,
                    after.trim_end()
                );
            };

            let value = resolve_var_expr(&after[..end])
                .with_context(|| format!("Cannot expand `{}` on line {}", key, number + 1))?;
            result.push_str(&value);
            rest = &after[end + 1..];
        }
        result.push_str(rest);
    }

    Ok(result)
}

/// Resolve `VAR` or `VAR:-default`. An empty variable takes the default.
fn resolve_var_expr(expr: &str) -> Result<String> {
    let (name, default) = match expr.split_once(":-") {
        Some((name, default)) => (name.trim(), Some(default)),
        None => (expr.trim(), None),
    };

    match (std::env::var(name), default) {
        (Ok(value), Some(default)) if value.is_empty() => Ok(default.to_string()),
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => anyhow::bail!("Environment variable {} not set", name),
    }
}

// ============================================================================
// Validation
// ============================================================================

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
pub const LOG_FORMATS: [&str; 2] = ["json", "pretty"];

pub fn validate_config(config: &TilerConfig) -> Result<()> {
    anyhow::ensure!(
        !config.dataset_dir.as_os_str().is_empty(),
        "dataset_dir cannot be empty"
    );
    anyhow::ensure!(
        !config.out_dir.as_os_str().is_empty(),
        "out_dir cannot be empty"
    );
    anyhow::ensure!(
        !config.dataset.raster_extensions.is_empty(),
        "dataset.raster_extensions cannot be empty"
    );

    config.aoi.to_region().context("Invalid aoi")?;
    config.cutter.validate().context("Invalid cutter settings")?;

    anyhow::ensure!(
        LOG_LEVELS.contains(&config.logging.level.as_str()),
        "Invalid log level: {}. Must be one of: {:?}",
        config.logging.level,
        LOG_LEVELS
    );
    anyhow::ensure!(
        LOG_FORMATS.contains(&config.logging.format.as_str()),
        "Invalid log format: {}. Must be one of: {:?}",
        config.logging.format,
        LOG_FORMATS
    );

    Ok(())
}
