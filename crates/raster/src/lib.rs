//! Raster collaborators of the tile cutter.
//!
//! Both operations sit behind traits so the cutter can be driven by other
//! backends (for example a GDAL-based reader for NITF products) without
//! touching the orchestration code.

pub mod crop;
pub mod tone;

pub use crop::{ImageCropper, RasterCropper};
pub use tone::{PercentileToneMapper, ToneMapper};
