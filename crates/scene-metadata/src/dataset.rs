//! Dataset discovery: raw rasters paired with their metadata sidecars.

use std::path::{Path, PathBuf};

use projection::{HeightRange, RpcModel};
use serde::{Deserialize, Serialize};
use tile_common::{Result, TilerError};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::record::ImageMetadata;
use crate::xml::parse_metadata;

/// How rasters and sidecars are recognized in a dataset directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetOptions {
    /// Raster file extensions, matched case-insensitively
    pub raster_extensions: Vec<String>,
    /// Extension of the sidecar that shares each raster's stem
    pub metadata_extension: String,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            raster_extensions: vec!["NTF".to_string(), "TIF".to_string(), "TIFF".to_string()],
            metadata_extension: "XML".to_string(),
        }
    }
}

impl DatasetOptions {
    pub fn is_raster(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.raster_extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Sidecar path for a raster: same stem, metadata extension.
    ///
    /// The configured casing is tried first, then lower and upper case. When
    /// none exists the configured path is returned so errors name it.
    pub fn sidecar_path(&self, raster_path: &Path) -> PathBuf {
        let configured = raster_path.with_extension(&self.metadata_extension);
        if configured.is_file() {
            return configured;
        }

        [
            self.metadata_extension.to_ascii_lowercase(),
            self.metadata_extension.to_ascii_uppercase(),
        ]
        .iter()
        .map(|ext| raster_path.with_extension(ext))
        .find(|candidate| candidate.is_file())
        .unwrap_or(configured)
    }
}

/// One raw scene: a raster and its parsed metadata. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub raster_path: PathBuf,
    pub metadata_path: PathBuf,
    pub metadata: ImageMetadata,
}

impl RawImage {
    /// Load a raster's sidecar.
    pub fn load(raster_path: &Path, options: &DatasetOptions) -> Result<Self> {
        let metadata_path = options.sidecar_path(raster_path);
        let metadata = parse_metadata(&metadata_path)?;
        Ok(Self {
            raster_path: raster_path.to_path_buf(),
            metadata_path,
            metadata,
        })
    }

    /// File name of the raster, for logs and reports.
    pub fn name(&self) -> String {
        self.raster_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.raster_path.display().to_string())
    }
}

/// The collection of raw scenes, ordered by capture time.
#[derive(Debug, Clone)]
pub struct Dataset {
    dir: PathBuf,
    images: Vec<RawImage>,
}

impl Dataset {
    /// Find every raster directly inside `dir` and parse its sidecar.
    ///
    /// Rasters are listed in file-name order and then stably sorted by
    /// capture time, so equal timestamps keep a reproducible order. Any
    /// unreadable or malformed sidecar fails the whole discovery.
    pub fn discover(dir: &Path, options: &DatasetOptions) -> Result<Self> {
        if !dir.is_dir() {
            return Err(TilerError::Config(format!(
                "dataset directory {} does not exist",
                dir.display()
            )));
        }

        let mut images = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| TilerError::io(dir, e))?;
            if !entry.file_type().is_file() || !options.is_raster(entry.path()) {
                continue;
            }

            let image = RawImage::load(entry.path(), options)?;
            debug!(
                raster = %image.raster_path.display(),
                capture_time = %image.metadata.capture_time,
                cloud_cover = image.metadata.cloud_cover,
                "Discovered raster"
            );
            images.push(image);
        }

        let dataset = Self::from_images(dir, images);
        info!(
            dir = %dir.display(),
            images = dataset.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Build a dataset from already loaded images.
    pub fn from_images(dir: &Path, mut images: Vec<RawImage>) -> Self {
        images.sort_by_key(|image| image.metadata.capture_time);
        Self {
            dir: dir.to_path_buf(),
            images,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Images in ascending capture-time order.
    pub fn images(&self) -> &[RawImage] {
        &self.images
    }

    pub fn get(&self, index: usize) -> Option<&RawImage> {
        self.images.get(index)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn rpc_models(&self) -> impl Iterator<Item = &RpcModel> {
        self.images.iter().map(|image| &image.metadata.rpc)
    }

    /// Height envelope shared by every region cut from this dataset.
    pub fn height_range(&self) -> Result<HeightRange> {
        Ok(HeightRange::estimate(self.rpc_models())?)
    }
}
