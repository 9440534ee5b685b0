//! Radiometric normalization of tiles to 8 bits.

use std::fs;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageBuffer, RgbImage};
use rayon::prelude::*;
use tile_common::{Result, TilerError};
use tracing::debug;

/// Normalizes a raster's radiometry, reading `src` and writing `dst`.
///
/// `src` and `dst` may be the same path. Implementations must be
/// idempotent: normalizing an already normalized raster leaves it unchanged.
pub trait ToneMapper: Send + Sync {
    fn normalize(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// Gamma plus percentile stretch to 8 bits.
///
/// Samples are raised to `1 / gamma`, clipped to the `[low, high]`
/// percentiles of the gamma-corrected values (linear interpolation between
/// ranks), and stretched onto 0..=255. Rasters that are already 8-bit are
/// left as they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileToneMapper {
    pub gamma: f64,
    /// Lower clip percentile in [0, 100]
    pub low_percentile: f64,
    /// Upper clip percentile in [0, 100]
    pub high_percentile: f64,
}

impl Default for PercentileToneMapper {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            low_percentile: 0.5,
            high_percentile: 99.5,
        }
    }
}

impl PercentileToneMapper {
    /// Map 16-bit samples onto 8 bits.
    pub fn stretch(&self, samples: &[u16]) -> Vec<u8> {
        if samples.is_empty() {
            return Vec::new();
        }

        let exponent = 1.0 / self.gamma;
        let mut sorted = samples.to_vec();
        sorted.par_sort_unstable();

        // Gamma is monotonic, so ranks of raw and corrected samples agree
        let low = percentile(&sorted, self.low_percentile, exponent);
        let high = percentile(&sorted, self.high_percentile, exponent);
        let span = high - low;
        if span <= 0.0 {
            return vec![0; samples.len()];
        }

        samples
            .par_iter()
            .map(|&v| {
                let g = (v as f64).powf(exponent).clamp(low, high);
                ((g - low) / span * 255.0) as u8
            })
            .collect()
    }

    fn map_image(&self, image: DynamicImage) -> Result<Option<DynamicImage>> {
        let mapped = match image {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_) => return Ok(None),
            DynamicImage::ImageLuma16(buf) => {
                let (w, h) = buf.dimensions();
                let out: Option<GrayImage> = ImageBuffer::from_raw(w, h, self.stretch(buf.as_raw()));
                out.map(DynamicImage::ImageLuma8)
            }
            DynamicImage::ImageLumaA16(_) => {
                return self.map_image(DynamicImage::ImageLuma16(image.into_luma16()));
            }
            other => {
                let buf = other.into_rgb16();
                let (w, h) = buf.dimensions();
                let out: Option<RgbImage> = ImageBuffer::from_raw(w, h, self.stretch(buf.as_raw()));
                out.map(DynamicImage::ImageRgb8)
            }
        };

        mapped
            .map(Some)
            .ok_or_else(|| TilerError::Data("tone mapped buffer size mismatch".to_string()))
    }
}

impl ToneMapper for PercentileToneMapper {
    fn normalize(&self, src: &Path, dst: &Path) -> Result<()> {
        let image = image::open(src).map_err(|e| TilerError::io(src, e))?;

        match self.map_image(image)? {
            Some(mapped) => {
                mapped.save(dst).map_err(|e| TilerError::io(dst, e))?;
                debug!(src = %src.display(), dst = %dst.display(), "Tone mapped raster");
            }
            None if src != dst => {
                fs::copy(src, dst).map_err(|e| TilerError::io(dst, e))?;
            }
            None => {}
        }
        Ok(())
    }
}

/// Percentile `q` (0-100) of gamma-corrected sorted samples.
fn percentile(sorted: &[u16], q: f64, exponent: f64) -> f64 {
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let a = (sorted[lower] as f64).powf(exponent);
    let b = (sorted[upper] as f64).powf(exponent);
    a + (b - a) * (rank - lower as f64)
}
