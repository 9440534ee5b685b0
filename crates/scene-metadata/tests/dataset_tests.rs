//! Dataset discovery over synthetic scenes written to disk.

use std::fs;

use scene_metadata::{parse_metadata, Dataset, DatasetOptions};
use test_utils::{
    affine_rpc, create_dataset, study_area, time, worldview_xml, write_scene, SceneSpec,
    METADATA_EXTENSION, RASTER_EXTENSION,
};
use tile_common::{format_capture_time, TilerError};

fn png_options() -> DatasetOptions {
    DatasetOptions {
        raster_extensions: vec![RASTER_EXTENSION.to_string()],
        metadata_extension: METADATA_EXTENSION.to_string(),
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_images_sorted_by_capture_time() {
    // File-name order is the reverse of capture order
    let dir = create_dataset(&[
        SceneSpec::new("a_scene", affine_rpc()).captured_at(time::LATER_TIME),
        SceneSpec::new("b_scene", affine_rpc()).captured_at(time::REFERENCE_TIME),
        SceneSpec::new("c_scene", affine_rpc()).captured_at(time::EARLIER_TIME),
    ]);

    let dataset = Dataset::discover(dir.path(), &png_options()).unwrap();
    let names: Vec<String> = dataset.images().iter().map(|image| image.name()).collect();
    assert_eq!(names, ["c_scene.png", "b_scene.png", "a_scene.png"]);

    let times: Vec<_> = dataset
        .images()
        .iter()
        .map(|image| image.metadata.capture_time)
        .collect();
    assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_equal_capture_times_keep_name_order() {
    let dir = create_dataset(&[
        SceneSpec::new("scene_2", affine_rpc()),
        SceneSpec::new("scene_1", affine_rpc()),
        SceneSpec::new("scene_3", affine_rpc()),
    ]);

    let dataset = Dataset::discover(dir.path(), &png_options()).unwrap();
    let names: Vec<String> = dataset.images().iter().map(|image| image.name()).collect();
    assert_eq!(names, ["scene_1.png", "scene_2.png", "scene_3.png"]);
}

// ============================================================================
// Discovery rules
// ============================================================================

#[test]
fn test_ignores_non_raster_files_and_subdirectories() {
    let dir = create_dataset(&[SceneSpec::new("only", affine_rpc())]);
    fs::write(dir.path().join("notes.txt"), "field notes").unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    write_scene(&nested, &SceneSpec::new("deeper", affine_rpc()));

    let dataset = Dataset::discover(dir.path(), &png_options()).unwrap();
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.images()[0].name(), "only.png");
    assert_eq!(
        dataset.images()[0].metadata_path,
        dir.path().join("only.XML")
    );
}

#[test]
fn test_missing_sidecar_is_fatal() {
    let dir = create_dataset(&[SceneSpec::new("paired", affine_rpc())]);
    fs::remove_file(dir.path().join("paired.XML")).unwrap();

    let result = Dataset::discover(dir.path(), &png_options());
    assert!(matches!(result, Err(TilerError::Io { .. })));
}

#[test]
fn test_lowercase_sidecar_is_found() {
    let dir = create_dataset(&[SceneSpec::new("scene", affine_rpc())]);
    let lowercase = dir.path().join("scene.xml");
    fs::rename(dir.path().join("scene.XML"), &lowercase).unwrap();

    let dataset = Dataset::discover(dir.path(), &png_options()).unwrap();
    assert_eq!(dataset.len(), 1);
    let metadata_path = &dataset.images()[0].metadata_path;
    assert!(metadata_path.is_file());
    assert!(metadata_path
        .to_string_lossy()
        .eq_ignore_ascii_case(&lowercase.to_string_lossy()));
}

#[test]
fn test_malformed_sidecar_is_fatal() {
    let dir = create_dataset(&[
        SceneSpec::new("good", affine_rpc()),
        SceneSpec::new("bad", affine_rpc()),
    ]);
    fs::write(dir.path().join("bad.XML"), "<isd><IMD><NUMROWS>abc</NUMROWS></IMD></isd>").unwrap();

    let err = Dataset::discover(dir.path(), &png_options()).unwrap_err();
    assert!(matches!(err, TilerError::Data(_)));
    assert!(err.is_fatal_for_run());
    assert!(err.to_string().contains("bad.XML"));
}

// ============================================================================
// Parsed content
// ============================================================================

#[test]
fn test_generated_sidecar_round_trips_camera() {
    let dir = tempfile::tempdir().unwrap();
    let scene = SceneSpec::new("wv", affine_rpc())
        .cloud_cover(0.35)
        .captured_at(time::REFERENCE_TIME);
    let path = dir.path().join("wv.XML");
    fs::write(&path, worldview_xml(&scene)).unwrap();

    let meta = parse_metadata(&path).unwrap();
    assert_eq!(meta.rpc, affine_rpc());
    assert_eq!(meta.cloud_cover, 0.35);
    assert_eq!(meta.width, study_area::SCENE_SIZE);
    assert_eq!(format_capture_time(&meta.capture_time), "20160310180412");
    assert!(meta.sat_elevation.is_some());
}

#[test]
fn test_height_range_spans_all_cameras() {
    let mut high = affine_rpc();
    high.alt_off = 4000.0;
    high.alt_scale = 300.0;
    let dir = create_dataset(&[
        SceneSpec::new("low", affine_rpc()),
        SceneSpec::new("high", high),
    ]);

    let dataset = Dataset::discover(dir.path(), &png_options()).unwrap();
    let range = dataset.height_range().unwrap();
    assert_eq!(range.min, study_area::ALT_OFF - study_area::ALT_SCALE);
    assert_eq!(range.max, 4300.0);
}
