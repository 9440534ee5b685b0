//! Synthetic raster generators and on-disk scene writers.
//!
//! Rasters are 16-bit grayscale, the usual depth of panchromatic satellite
//! products, and are written as PNG since the image crate can round-trip them.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Luma};

use crate::fixtures::{worldview_xml, SceneSpec};

/// 16-bit single band image buffer.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Extension used for synthetic rasters.
pub const RASTER_EXTENSION: &str = "png";

/// Extension used for synthetic metadata sidecars.
pub const METADATA_EXTENSION: &str = "XML";

/// Creates a raster with predictable values.
///
/// Each pixel is `col * 100 + row`, so a crop can be checked against its
/// source window by reading back any pixel.
///
/// # Example
///
/// ```
/// use test_utils::create_gradient_raster;
///
/// let raster = create_gradient_raster(200, 150);
/// assert_eq!(raster.get_pixel(0, 0)[0], 0);
/// assert_eq!(raster.get_pixel(3, 7)[0], 307);
/// ```
pub fn create_gradient_raster(width: u32, height: u32) -> Gray16Image {
    ImageBuffer::from_fn(width, height, |col, row| {
        Luma([(col * 100 + row).min(u16::MAX as u32) as u16])
    })
}

/// Creates a raster where every pixel has the same value.
pub fn create_constant_raster(width: u32, height: u32, value: u16) -> Gray16Image {
    ImageBuffer::from_pixel(width, height, Luma([value]))
}

/// Expected value of a gradient raster pixel.
pub fn gradient_value(col: u32, row: u32) -> u16 {
    (col * 100 + row).min(u16::MAX as u32) as u16
}

/// Write a scene's gradient raster and XML sidecar into `dir`.
///
/// Returns the raster path.
pub fn write_scene(dir: &Path, scene: &SceneSpec) -> PathBuf {
    let raster_path = dir.join(format!("{}.{}", scene.name, RASTER_EXTENSION));
    create_gradient_raster(scene.width, scene.height)
        .save(&raster_path)
        .expect("write synthetic raster");

    let xml_path = dir.join(format!("{}.{}", scene.name, METADATA_EXTENSION));
    fs::write(&xml_path, worldview_xml(scene)).expect("write synthetic sidecar");

    raster_path
}

/// Create a temporary dataset directory holding the given scenes.
pub fn create_dataset(scenes: &[SceneSpec]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("create dataset dir");
    for scene in scenes {
        write_scene(dir.path(), scene);
    }
    dir
}
