//! On-disk layout of a cut dataset.
//!
//! ```text
//! out_dir/
//!   aoi_dict.json
//!   images/{key}.png
//!   metas/{key}.json
//!   regions/{key}.json
//!   .staging/
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tile_common::{GeographicRegion, Result, TilerError};
use tracing::info;

pub const IMAGES_DIR: &str = "images";
pub const METAS_DIR: &str = "metas";
pub const REGIONS_DIR: &str = "regions";
pub const STAGING_DIR: &str = ".staging";
pub const AOI_FILE: &str = "aoi_dict.json";

/// Output directory structure.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Create the output subdirectories under an existing `out_dir`.
    ///
    /// Run once before any region is cut. Existing subdirectories are reused.
    pub fn initialize(out_dir: &Path) -> Result<Self> {
        if !out_dir.is_dir() {
            return Err(TilerError::Config(format!(
                "output directory {} does not exist",
                out_dir.display()
            )));
        }

        let layout = Self {
            root: out_dir.to_path_buf(),
        };
        for dir in [
            layout.images_dir(),
            layout.metas_dir(),
            layout.regions_dir(),
            layout.staging_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(|e| TilerError::io(&dir, e))?;
        }

        info!(out_dir = %out_dir.display(), "Initialized output layout");
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn metas_dir(&self) -> PathBuf {
        self.root.join(METAS_DIR)
    }

    pub fn regions_dir(&self) -> PathBuf {
        self.root.join(REGIONS_DIR)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    pub fn aoi_path(&self) -> PathBuf {
        self.root.join(AOI_FILE)
    }

    pub fn image_path(&self, key: &str) -> PathBuf {
        self.images_dir().join(format!("{}.png", key))
    }

    pub fn meta_path(&self, key: &str) -> PathBuf {
        self.metas_dir().join(format!("{}.json", key))
    }

    pub fn region_path(&self, key: &str) -> PathBuf {
        self.regions_dir().join(format!("{}.json", key))
    }

    /// Scratch file for one artifact of a tile being produced.
    pub fn staging_path(&self, key: &str, artifact: &str) -> PathBuf {
        self.staging_dir().join(format!("{}.{}", key, artifact))
    }

    /// Write the area-of-interest descriptor.
    pub fn write_aoi(&self, region: &GeographicRegion) -> Result<PathBuf> {
        let path = self.aoi_path();
        write_json(&path, region)?;
        Ok(path)
    }
}

/// Serialize `value` as pretty JSON into `path`.
pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| TilerError::io(path, e))
}
