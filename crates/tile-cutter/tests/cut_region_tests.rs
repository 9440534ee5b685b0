//! End-to-end cutting over a synthetic four-scene dataset.
//!
//! Scenes, in capture order:
//! - `b_cloudy`  2015, cloud 0.8                 -> rejected cloudy
//! - `a_clear`   2016-03, footprint inside frame -> tile 000
//! - `c_away`    2016-07, footprint off frame    -> rejected low coverage
//! - `d_shifted` 2017, footprint 91% in frame    -> tile 001

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::GenericImageView;
use raster::{ImageCropper, RasterCropper};
use scene_metadata::{DatasetOptions, ImageMetadata};
use test_utils::{
    affine_rpc, affine_rpc_with_offsets, create_dataset, study_region, time, SceneSpec,
    METADATA_EXTENSION, RASTER_EXTENSION,
};
use tile_common::{GeographicRegion, PixelRect, Result, TilerError};
use tile_cutter::{CutterConfig, DecisionCounts, ImageDecision, TileCutter};

const MIDYEAR_TIME: &str = "2016-07-04T17:30:00.000000Z";

fn png_options() -> DatasetOptions {
    DatasetOptions {
        raster_extensions: vec![RASTER_EXTENSION.to_string()],
        metadata_extension: METADATA_EXTENSION.to_string(),
    }
}

fn scenes() -> Vec<SceneSpec> {
    vec![
        SceneSpec::new("a_clear", affine_rpc())
            .captured_at(time::REFERENCE_TIME)
            .cloud_cover(0.1),
        SceneSpec::new("b_cloudy", affine_rpc())
            .captured_at(time::EARLIER_TIME)
            .cloud_cover(0.8),
        SceneSpec::new("c_away", affine_rpc_with_offsets(-1000.0, 100.0)).captured_at(MIDYEAR_TIME),
        SceneSpec::new("d_shifted", affine_rpc_with_offsets(40.0, 100.0))
            .captured_at(time::LATER_TIME)
            .without_angles(),
    ]
}

fn cutter(dataset_dir: &Path, out_dir: &Path, config: CutterConfig) -> TileCutter {
    TileCutter::open(dataset_dir, out_dir, &png_options(), config).unwrap()
}

fn file_names(dir: PathBuf) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_plan_decisions_in_capture_order() {
    let data = create_dataset(&scenes());
    let out = tempfile::tempdir().unwrap();
    let cutter = cutter(data.path(), out.path(), CutterConfig::default());

    let plan = cutter.plan_region(&study_region()).unwrap();
    assert!(!plan.cancelled);
    assert_eq!(plan.assessments.len(), 4);

    let names: Vec<String> = cutter.dataset().images().iter().map(|i| i.name()).collect();
    assert_eq!(names, ["b_cloudy.png", "a_clear.png", "c_away.png", "d_shifted.png"]);

    assert_eq!(
        plan.assessments[0].decision,
        ImageDecision::RejectedCloudy { cloud_cover: 0.8 }
    );
    assert_eq!(
        plan.assessments[1].decision,
        ImageDecision::Accepted {
            window: PixelRect::new(50, 50, 101, 101),
            overlap_ratio: 1.0,
        }
    );
    assert_eq!(
        plan.assessments[2].decision,
        ImageDecision::RejectedLowCoverage { overlap_ratio: 0.0 }
    );
    match plan.assessments[3].decision {
        ImageDecision::Accepted {
            window,
            overlap_ratio,
        } => {
            assert_eq!(window, PixelRect::new(0, 50, 91, 101));
            assert!((overlap_ratio - 91.0 / 101.0).abs() < 1e-12);
        }
        other => panic!("expected acceptance, got {:?}", other),
    }

    // Planning writes nothing
    assert!(file_names(cutter.layout().images_dir()).is_empty());
}

#[test]
fn test_thresholds_are_configurable() {
    let data = create_dataset(&scenes());
    let out = tempfile::tempdir().unwrap();
    let config = CutterConfig {
        cloud_threshold: 0.9,
        coverage_threshold: 0.95,
        parallel: false,
    };
    let cutter = cutter(data.path(), out.path(), config);

    let counts = cutter.plan_region(&study_region()).unwrap().counts();
    // The cloudy scene now passes; the shifted scene no longer covers enough
    assert_eq!(
        counts,
        DecisionCounts {
            accepted: 2,
            rejected_cloudy: 0,
            rejected_low_coverage: 2,
            pending: 0,
        }
    );
}

// ============================================================================
// Cutting
// ============================================================================

#[test]
fn test_cut_aoi_writes_tiles_in_acceptance_order() {
    let data = create_dataset(&scenes());
    let out = tempfile::tempdir().unwrap();
    let cutter = cutter(data.path(), out.path(), CutterConfig::default());
    let region = study_region();

    let report = cutter.cut_aoi(&region).unwrap();
    assert!(!report.cancelled);

    let keys: Vec<&str> = report.tiles.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, ["000_20160310180412", "001_20170121181005"]);
    assert_eq!(report.tiles[0].image_index, 1);
    assert_eq!(report.tiles[1].image_index, 3);

    assert_eq!(
        file_names(out.path().join("images")),
        ["000_20160310180412.png", "001_20170121181005.png"]
    );
    assert_eq!(
        file_names(out.path().join("metas")),
        ["000_20160310180412.json", "001_20170121181005.json"]
    );
    assert_eq!(file_names(out.path().join("regions")).len(), 2);
    assert!(file_names(out.path().join(".staging")).is_empty());

    let aoi: GeographicRegion =
        serde_json::from_str(&fs::read_to_string(out.path().join("aoi_dict.json")).unwrap()).unwrap();
    assert_eq!(aoi, region);
    let per_tile: GeographicRegion =
        serde_json::from_str(&fs::read_to_string(&report.tiles[1].region_path).unwrap()).unwrap();
    assert_eq!(per_tile, region);
}

#[test]
fn test_tile_metadata_keeps_camera_valid() {
    let data = create_dataset(&scenes());
    let out = tempfile::tempdir().unwrap();
    let cutter = cutter(data.path(), out.path(), CutterConfig::default());
    let report = cutter.cut_region(&study_region()).unwrap();

    let shifted = &report.tiles[1];
    let meta = ImageMetadata::from_json(&fs::read_to_string(&shifted.meta_path).unwrap()).unwrap();
    assert_eq!((meta.width, meta.height), (91, 101));
    assert_eq!(meta.rpc.col_off, 40.0);
    assert_eq!(meta.rpc.row_off, 50.0);
    assert_eq!(meta.cloud_cover, 0.0);
    assert_eq!(meta.sun_azimuth, None);

    // The study area's NE corner sits on the tile's right edge
    let (col, row) = meta.rpc.project_point(40.005, -104.995, 1500.0).unwrap();
    assert!((col - 90.0).abs() < 1e-3);
    assert!((row - 0.0).abs() < 1e-3);

    let tile = image::open(&shifted.image_path).unwrap();
    assert_eq!(tile.dimensions(), (91, 101));
    assert!(matches!(tile, image::DynamicImage::ImageLuma8(_)));
}

#[test]
fn test_serial_and_parallel_runs_agree() {
    let data = create_dataset(&scenes());
    let serial_out = tempfile::tempdir().unwrap();
    let parallel_out = tempfile::tempdir().unwrap();

    let serial = cutter(
        data.path(),
        serial_out.path(),
        CutterConfig {
            parallel: false,
            ..Default::default()
        },
    )
    .cut_region(&study_region())
    .unwrap();
    let parallel = cutter(data.path(), parallel_out.path(), CutterConfig::default())
        .cut_region(&study_region())
        .unwrap();

    assert_eq!(serial.assessments, parallel.assessments);
    for (a, b) in serial.tiles.iter().zip(&parallel.tiles) {
        assert_eq!(a.key, b.key);
        assert_eq!(fs::read(&a.meta_path).unwrap(), fs::read(&b.meta_path).unwrap());
        assert_eq!(fs::read(&a.image_path).unwrap(), fs::read(&b.image_path).unwrap());
    }
}

// ============================================================================
// Failure and cancellation
// ============================================================================

/// Delegates to the real cropper but fails for one source.
struct FailingCropper {
    fail_on: &'static str,
}

impl RasterCropper for FailingCropper {
    fn crop(&self, src: &Path, dst: &Path, src_extent: (u32, u32), window: &PixelRect) -> Result<()> {
        if src.to_string_lossy().contains(self.fail_on) {
            return Err(TilerError::io(src, "simulated read failure"));
        }
        ImageCropper.crop(src, dst, src_extent, window)
    }
}

#[test]
fn test_failed_tile_aborts_region_without_partial_output() {
    let data = create_dataset(&scenes());
    let out = tempfile::tempdir().unwrap();
    for parallel in [false, true] {
        let cutter = cutter(
            data.path(),
            out.path(),
            CutterConfig {
                parallel,
                ..Default::default()
            },
        )
        .with_cropper(FailingCropper { fail_on: "d_shifted" });

        let err = cutter.cut_region(&study_region()).unwrap_err();
        assert!(matches!(err, TilerError::Io { .. }));

        for sub in ["images", "metas", "regions", ".staging"] {
            assert!(file_names(out.path().join(sub)).is_empty(), "{} not empty", sub);
        }
    }
}

#[test]
fn test_cancelled_region_writes_nothing() {
    let data = create_dataset(&scenes());
    let out = tempfile::tempdir().unwrap();
    let flag = Arc::new(AtomicBool::new(false));
    let cutter = cutter(data.path(), out.path(), CutterConfig::default()).with_cancel_flag(flag.clone());

    flag.store(true, Ordering::Relaxed);
    let report = cutter.cut_region(&study_region()).unwrap();

    assert!(report.cancelled);
    assert!(report.tiles.is_empty());
    assert_eq!(report.counts().pending, 4);
    assert!(file_names(out.path().join("images")).is_empty());
}

#[test]
fn test_zero_denominator_camera_is_fatal() {
    let mut broken = affine_rpc();
    broken.col_den = [0.0; projection::RPC_COEFFICIENTS];
    let data = create_dataset(&[SceneSpec::new("broken", broken)]);
    let out = tempfile::tempdir().unwrap();
    let cutter = cutter(data.path(), out.path(), CutterConfig::default());

    let err = cutter.cut_region(&study_region()).unwrap_err();
    assert!(matches!(err, TilerError::Data(_)));
    assert!(err.to_string().contains("broken.png"));
}

#[test]
fn test_near_singular_camera_is_rejected_for_low_coverage() {
    let mut unstable = affine_rpc();
    unstable.row_den[0] = 1e-9;
    unstable.col_den[0] = 1e-9;
    let data = create_dataset(&[SceneSpec::new("unstable", unstable)]);
    let out = tempfile::tempdir().unwrap();
    let cutter = cutter(data.path(), out.path(), CutterConfig::default());

    let plan = cutter.plan_region(&study_region()).unwrap();
    match plan.assessments[0].decision {
        ImageDecision::RejectedLowCoverage { overlap_ratio } => assert!(overlap_ratio < 1e-6),
        other => panic!("expected low coverage, got {:?}", other),
    }
}

#[test]
fn test_empty_dataset_cannot_build_cutter() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let result = TileCutter::open(data.path(), out.path(), &png_options(), CutterConfig::default());
    assert!(matches!(result, Err(TilerError::Data(_))));
}
