//! Cutter policy configuration.

use serde::{Deserialize, Serialize};
use tile_common::{Result, TilerError};

/// Default maximum cloud-cover fraction for an image to be considered.
pub const DEFAULT_CLOUD_THRESHOLD: f64 = 0.5;

/// Default minimum fraction of the region footprint an image must see.
pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 0.5;

/// Filtering policy and execution options for the cutter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterConfig {
    /// Images with cloud cover strictly above this are rejected
    pub cloud_threshold: f64,

    /// Images whose overlap ratio is strictly below this are rejected
    pub coverage_threshold: f64,

    /// Stage accepted tiles on the rayon pool
    pub parallel: bool,
}

impl Default for CutterConfig {
    fn default() -> Self {
        Self {
            cloud_threshold: DEFAULT_CLOUD_THRESHOLD,
            coverage_threshold: DEFAULT_COVERAGE_THRESHOLD,
            parallel: true,
        }
    }
}

impl CutterConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("cloud_threshold", self.cloud_threshold),
            ("coverage_threshold", self.coverage_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TilerError::Config(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
