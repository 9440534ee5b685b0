//! Per-image metadata record.

use chrono::{DateTime, Utc};
use projection::RpcModel;
use serde::{Deserialize, Serialize};
use tile_common::{PixelRect, Result, TilerError};

/// Metadata of one raster: size, acquisition, and camera model.
///
/// The same record describes a raw scene and, after [`ImageMetadata::cropped`],
/// a tile cut from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "capTime")]
    pub capture_time: DateTime<Utc>,
    /// Cloud-cover fraction in [0, 1]
    pub cloud_cover: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat_azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat_elevation: Option<f64>,
    pub rpc: RpcModel,
}

impl ImageMetadata {
    /// Full pixel extent of the image.
    pub fn extent(&self) -> PixelRect {
        PixelRect::full_extent(self.width, self.height)
    }

    /// Record for a crop of this image.
    ///
    /// The RPC offsets move by the window origin so the camera stays valid in
    /// the crop's pixel frame; width and height become the window size.
    pub fn cropped(&self, window: &PixelRect) -> Result<Self> {
        let width = u32::try_from(window.width).ok().filter(|w| *w > 0);
        let height = u32::try_from(window.height).ok().filter(|h| *h > 0);
        let (Some(width), Some(height)) = (width, height) else {
            return Err(TilerError::InvalidRegion(format!(
                "crop window {} has no pixels",
                window
            )));
        };

        Ok(Self {
            width,
            height,
            rpc: self.rpc.shifted(window.col as f64, window.row as f64),
            ..self.clone()
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use projection::RPC_COEFFICIENTS;

    fn sample() -> ImageMetadata {
        let mut den = [0.0; RPC_COEFFICIENTS];
        den[0] = 1.0;
        ImageMetadata {
            width: 35_180,
            height: 42_052,
            capture_time: Utc.with_ymd_and_hms(2016, 3, 10, 18, 4, 12).unwrap(),
            cloud_cover: 0.02,
            sun_azimuth: Some(163.4),
            sun_elevation: None,
            sat_azimuth: None,
            sat_elevation: None,
            rpc: RpcModel {
                row_off: 21_025.0,
                row_scale: 21_026.0,
                col_off: 17_589.0,
                col_scale: 17_590.0,
                lat_off: 39.97,
                lat_scale: 0.19,
                lon_off: -105.26,
                lon_scale: 0.21,
                alt_off: 1_700.0,
                alt_scale: 500.0,
                row_num: [0.0; RPC_COEFFICIENTS],
                row_den: den,
                col_num: [0.0; RPC_COEFFICIENTS],
                col_den: den,
            },
        }
    }

    #[test]
    fn test_cropped_shifts_offsets_and_resizes() {
        let meta = sample();
        let crop = meta.cropped(&PixelRect::new(1_000, 2_000, 512, 256)).unwrap();

        assert_eq!(crop.width, 512);
        assert_eq!(crop.height, 256);
        assert_eq!(crop.rpc.col_off, 16_589.0);
        assert_eq!(crop.rpc.row_off, 19_025.0);
        assert_eq!(crop.rpc.lat_off, meta.rpc.lat_off);
        assert_eq!(crop.capture_time, meta.capture_time);
        assert_eq!(crop.cloud_cover, meta.cloud_cover);
    }

    #[test]
    fn test_cropped_offsets_restore_exactly() {
        let meta = sample();
        let window = PixelRect::new(4_321, 987, 100, 100);
        let crop = meta.cropped(&window).unwrap();
        let restored = crop.rpc.shifted(-(window.col as f64), -(window.row as f64));
        assert_eq!(restored, meta.rpc);
    }

    #[test]
    fn test_cropped_rejects_empty_window() {
        let meta = sample();
        let result = meta.cropped(&PixelRect::new(0, 0, 0, 10));
        assert!(matches!(result, Err(TilerError::InvalidRegion(_))));
    }

    #[test]
    fn test_json_keys() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["width"], 35_180);
        assert_eq!(json["capTime"], "2016-03-10T18:04:12Z");
        assert_eq!(json["cloudCover"], 0.02);
        assert_eq!(json["sunAzimuth"], 163.4);
        assert!(json.get("satElevation").is_none());
        assert_eq!(json["rpc"]["colOff"], 17_589.0);
    }

    #[test]
    fn test_json_round_trip() {
        let meta = sample();
        assert_eq!(ImageMetadata::from_json(&meta.to_json().unwrap()).unwrap(), meta);
    }
}
