//! Cropping a raw raster to a pixel window.

use std::path::Path;

use image::GenericImageView;
use tile_common::{PixelRect, Result, TilerError};
use tracing::debug;

/// Crops a source raster to a window and writes the result.
pub trait RasterCropper: Send + Sync {
    /// Crop `src` to `window` and write it to `dst`.
    ///
    /// `src_extent` is the `(width, height)` the metadata reports for the
    /// source. An unreadable source, a size mismatch, or a window reaching
    /// outside the source all fail with [`TilerError::Io`].
    fn crop(
        &self,
        src: &Path,
        dst: &Path,
        src_extent: (u32, u32),
        window: &PixelRect,
    ) -> Result<()>;
}

/// Cropper backed by the `image` crate.
///
/// Handles every format the crate decodes (PNG, TIFF, ...); the output format
/// follows the destination extension and keeps the source bit depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCropper;

impl RasterCropper for ImageCropper {
    fn crop(
        &self,
        src: &Path,
        dst: &Path,
        src_extent: (u32, u32),
        window: &PixelRect,
    ) -> Result<()> {
        let (width, height) = src_extent;
        let extent = PixelRect::full_extent(width, height);
        if window.is_empty() || !extent.contains(window) {
            return Err(TilerError::io(
                src,
                format!("crop window {} outside {}x{} image", window, width, height),
            ));
        }

        let image = image::open(src).map_err(|e| TilerError::io(src, e))?;
        if image.dimensions() != src_extent {
            let (actual_w, actual_h) = image.dimensions();
            return Err(TilerError::io(
                src,
                format!(
                    "decoded size {}x{} differs from metadata {}x{}",
                    actual_w, actual_h, width, height
                ),
            ));
        }

        // The window lies inside the extent, so the casts cannot truncate
        let cropped = image.crop_imm(
            window.col as u32,
            window.row as u32,
            window.width as u32,
            window.height as u32,
        );
        cropped.save(dst).map_err(|e| TilerError::io(dst, e))?;

        debug!(
            src = %src.display(),
            dst = %dst.display(),
            window = %window,
            "Cropped raster"
        );
        Ok(())
    }
}
