//! Common test fixtures for sat-tiler tests.
//!
//! Every synthetic scene is built around one study area near Boulder, CO. The
//! affine RPC maps a 0.01 degree square onto a 200 x 200 pixel frame, so one
//! pixel spans 1e-4 degrees and the study region lands on pixels 50..=150.

use projection::{from_lat_lon, RpcModel, RPC_COEFFICIENTS};
use tile_common::GeographicRegion;

/// Study area definitions.
pub mod study_area {
    pub const CENTER_LAT: f64 = 40.0;
    pub const CENTER_LON: f64 = -105.0;

    /// Half the side of the study region in degrees
    pub const HALF_EXTENT_DEG: f64 = 0.005;

    /// Width and height of every synthetic scene
    pub const SCENE_SIZE: u32 = 200;

    pub const ALT_OFF: f64 = 1500.0;
    pub const ALT_SCALE: f64 = 500.0;
}

/// Common capture times.
pub mod time {
    /// A fixed reference capture time
    pub const REFERENCE_TIME: &str = "2016-03-10T18:04:12.250000Z";
    pub const EARLIER_TIME: &str = "2015-11-02T17:59:48.000000Z";
    pub const LATER_TIME: &str = "2017-01-21T18:10:05.500000Z";
}

fn unit_denominator() -> [f64; RPC_COEFFICIENTS] {
    let mut den = [0.0; RPC_COEFFICIENTS];
    den[0] = 1.0;
    den
}

/// North-up affine camera over the study area.
///
/// `col = (lon - lon_off) / 0.01 * 100 + 100` and
/// `row = -(lat - lat_off) / 0.01 * 100 + 100`; height has no effect.
pub fn affine_rpc() -> RpcModel {
    let mut row_num = [0.0; RPC_COEFFICIENTS];
    row_num[2] = -1.0;
    let mut col_num = [0.0; RPC_COEFFICIENTS];
    col_num[1] = 1.0;

    RpcModel {
        row_off: 100.0,
        row_scale: 100.0,
        col_off: 100.0,
        col_scale: 100.0,
        lat_off: study_area::CENTER_LAT,
        lat_scale: 0.01,
        lon_off: study_area::CENTER_LON,
        lon_scale: 0.01,
        alt_off: study_area::ALT_OFF,
        alt_scale: study_area::ALT_SCALE,
        row_num,
        row_den: unit_denominator(),
        col_num,
        col_den: unit_denominator(),
    }
}

/// The affine camera with its pixel frame moved, e.g. to push the footprint
/// partly or fully off the image.
pub fn affine_rpc_with_offsets(col_off: f64, row_off: f64) -> RpcModel {
    RpcModel {
        col_off,
        row_off,
        ..affine_rpc()
    }
}

/// UTM region whose corners are the study area's NW and SE corners.
pub fn study_region() -> GeographicRegion {
    let half = study_area::HALF_EXTENT_DEG;
    let ul = from_lat_lon(
        study_area::CENTER_LAT + half,
        study_area::CENTER_LON - half,
        None,
    )
    .expect("study area UL is inside UTM limits");
    let lr = from_lat_lon(
        study_area::CENTER_LAT - half,
        study_area::CENTER_LON + half,
        Some(ul.zone),
    )
    .expect("study area LR is inside UTM limits");

    GeographicRegion::from_corners(ul.zone, ul.easting, ul.northing, lr.easting, lr.northing)
        .expect("study region is well formed")
}

/// Description of one synthetic scene.
#[derive(Debug, Clone)]
pub struct SceneSpec {
    /// File stem shared by the raster and its sidecar
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub capture_time: String,
    pub cloud_cover: f64,
    pub rpc: RpcModel,
    /// Emit the optional sun/satellite angle elements
    pub with_angles: bool,
}

impl SceneSpec {
    pub fn new(name: &str, rpc: RpcModel) -> Self {
        Self {
            name: name.to_string(),
            width: study_area::SCENE_SIZE,
            height: study_area::SCENE_SIZE,
            capture_time: time::REFERENCE_TIME.to_string(),
            cloud_cover: 0.0,
            rpc,
            with_angles: true,
        }
    }

    pub fn captured_at(mut self, time: &str) -> Self {
        self.capture_time = time.to_string();
        self
    }

    pub fn cloud_cover(mut self, cloud_cover: f64) -> Self {
        self.cloud_cover = cloud_cover;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn without_angles(mut self) -> Self {
        self.with_angles = false;
        self
    }
}

fn coefficient_list(tag: &str, coeffs: &[f64; RPC_COEFFICIENTS]) -> String {
    let values: Vec<String> = coeffs.iter().map(|c| format!("{:+.12E}", c)).collect();
    format!(
        "      <{tag}List>\n        <{tag}>{}</{tag}>\n      </{tag}List>\n",
        values.join(" ")
    )
}

/// Render a WorldView-style XML sidecar for a scene.
pub fn worldview_xml(scene: &SceneSpec) -> String {
    let rpc = &scene.rpc;
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<isd>\n  <IMD>\n");
    xml.push_str("    <VERSION>AA</VERSION>\n");
    xml.push_str(&format!("    <NUMROWS>{}</NUMROWS>\n", scene.height));
    xml.push_str(&format!("    <NUMCOLUMNS>{}</NUMCOLUMNS>\n", scene.width));
    xml.push_str("    <IMAGE>\n      <SATID>WV03</SATID>\n");
    xml.push_str(&format!(
        "      <FIRSTLINETIME>{}</FIRSTLINETIME>\n",
        scene.capture_time
    ));
    xml.push_str(&format!(
        "      <CLOUDCOVER>{}</CLOUDCOVER>\n",
        scene.cloud_cover
    ));
    if scene.with_angles {
        xml.push_str("      <MEANSUNAZ>163.4</MEANSUNAZ>\n");
        xml.push_str("      <MEANSUNEL>36.9</MEANSUNEL>\n");
        xml.push_str("      <MEANSATAZ>211.7</MEANSATAZ>\n");
        xml.push_str("      <MEANSATEL>72.8</MEANSATEL>\n");
    }
    xml.push_str("    </IMAGE>\n  </IMD>\n");

    xml.push_str("  <RPB>\n    <SATID>WV03</SATID>\n    <IMAGE>\n");
    xml.push_str("      <ERRBIAS>3.2</ERRBIAS>\n");
    let scalars = [
        ("LINEOFFSET", rpc.row_off),
        ("SAMPOFFSET", rpc.col_off),
        ("LATOFFSET", rpc.lat_off),
        ("LONGOFFSET", rpc.lon_off),
        ("HEIGHTOFFSET", rpc.alt_off),
        ("LINESCALE", rpc.row_scale),
        ("SAMPSCALE", rpc.col_scale),
        ("LATSCALE", rpc.lat_scale),
        ("LONGSCALE", rpc.lon_scale),
        ("HEIGHTSCALE", rpc.alt_scale),
    ];
    for (tag, value) in scalars {
        xml.push_str(&format!("      <{tag}>{}</{tag}>\n", value));
    }
    xml.push_str(&coefficient_list("LINENUMCOEF", &rpc.row_num));
    xml.push_str(&coefficient_list("LINEDENCOEF", &rpc.row_den));
    xml.push_str(&coefficient_list("SAMPNUMCOEF", &rpc.col_num));
    xml.push_str(&coefficient_list("SAMPDENCOEF", &rpc.col_den));
    xml.push_str("    </IMAGE>\n  </RPB>\n</isd>\n");

    xml
}
