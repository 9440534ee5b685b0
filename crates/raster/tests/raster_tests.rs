//! Cropping and tone mapping against rasters on disk.

use std::fs;

use image::GenericImageView;
use raster::{ImageCropper, PercentileToneMapper, RasterCropper, ToneMapper};
use test_utils::{create_constant_raster, create_gradient_raster, gradient_value};
use tile_common::{PixelRect, TilerError};

// ============================================================================
// Cropping
// ============================================================================

#[test]
fn test_crop_keeps_pixels_and_depth() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("scene.png");
    let dst = dir.path().join("crop.png");
    create_gradient_raster(200, 200).save(&src).unwrap();

    ImageCropper
        .crop(&src, &dst, (200, 200), &PixelRect::new(50, 60, 101, 40))
        .unwrap();

    let crop = image::open(&dst).unwrap();
    assert_eq!(crop.dimensions(), (101, 40));
    let crop = crop.into_luma16();
    assert_eq!(crop.get_pixel(0, 0)[0], gradient_value(50, 60));
    assert_eq!(crop.get_pixel(100, 39)[0], gradient_value(150, 99));
}

#[test]
fn test_crop_full_extent() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("scene.png");
    let dst = dir.path().join("crop.png");
    create_gradient_raster(32, 16).save(&src).unwrap();

    ImageCropper
        .crop(&src, &dst, (32, 16), &PixelRect::full_extent(32, 16))
        .unwrap();
    assert_eq!(image::open(&dst).unwrap().dimensions(), (32, 16));
}

#[test]
fn test_crop_rejects_size_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("scene.png");
    create_gradient_raster(100, 80).save(&src).unwrap();

    let err = ImageCropper
        .crop(&src, &dir.path().join("crop.png"), (200, 200), &PixelRect::new(0, 0, 10, 10))
        .unwrap_err();
    assert!(matches!(err, TilerError::Io { .. }));
    assert!(err.to_string().contains("differs from metadata"));
    assert!(!dir.path().join("crop.png").exists());
}

#[test]
fn test_crop_rejects_corrupt_source() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("scene.png");
    fs::write(&src, b"not a png").unwrap();

    let result = ImageCropper.crop(&src, &dir.path().join("crop.png"), (10, 10), &PixelRect::new(0, 0, 5, 5));
    assert!(matches!(result, Err(TilerError::Io { .. })));
}

// ============================================================================
// Tone mapping
// ============================================================================

#[test]
fn test_tone_map_converts_to_eight_bit_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile.png");
    create_gradient_raster(64, 64).save(&path).unwrap();

    PercentileToneMapper::default().normalize(&path, &path).unwrap();

    let mapped = image::open(&path).unwrap();
    assert!(matches!(mapped, image::DynamicImage::ImageLuma8(_)));
    let mapped = mapped.into_luma8();
    // Gradient grows with column, so the stretch keeps that order
    assert!(mapped.get_pixel(0, 0)[0] < mapped.get_pixel(63, 0)[0]);
    assert_eq!(mapped.get_pixel(0, 0)[0], 0);
    assert_eq!(mapped.get_pixel(63, 63)[0], 255);
}

#[test]
fn test_tone_map_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile.png");
    create_gradient_raster(48, 48).save(&path).unwrap();

    let mapper = PercentileToneMapper::default();
    mapper.normalize(&path, &path).unwrap();
    let first = fs::read(&path).unwrap();
    mapper.normalize(&path, &path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), first);

    let copy = dir.path().join("copy.png");
    mapper.normalize(&path, &copy).unwrap();
    assert_eq!(fs::read(&copy).unwrap(), first);
}

#[test]
fn test_tone_map_flat_tile() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("flat.png");
    let dst = dir.path().join("flat8.png");
    create_constant_raster(16, 16, 3000).save(&src).unwrap();

    PercentileToneMapper::default().normalize(&src, &dst).unwrap();
    let mapped = image::open(&dst).unwrap().into_luma8();
    assert!(mapped.pixels().all(|p| p[0] == 0));
}

#[test]
fn test_tone_map_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let err = PercentileToneMapper::default()
        .normalize(&dir.path().join("missing.png"), &dir.path().join("out.png"))
        .unwrap_err();
    assert!(matches!(err, TilerError::Io { .. }));
}
