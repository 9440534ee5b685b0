//! Universal Transverse Mercator conversion on the WGS84 ellipsoid.
//!
//! Uses the series expansions of Snyder, "Map Projections: A Working
//! Manual" (USGS PP 1395), truncated at sixth order. A round trip stays
//! within about a millimeter anywhere inside a zone.

use std::f64::consts::PI;

use tile_common::region::ZONE_LETTERS;
use tile_common::{GeographicRegion, UtmZone};

use crate::error::ProjectionError;

/// Scale factor on the central meridian
const K0: f64 = 0.9996;
/// WGS84 semi-major axis (meters)
const R: f64 = 6_378_137.0;
/// WGS84 first eccentricity squared
const E: f64 = 0.006_694_38;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A projected point with the zone it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmCoord {
    pub easting: f64,
    pub northing: f64,
    pub zone: UtmZone,
}

struct Ellipsoid {
    e_p2: f64,
    m1: f64,
    m2: f64,
    m3: f64,
    m4: f64,
    p2: f64,
    p3: f64,
    p4: f64,
    p5: f64,
}

impl Ellipsoid {
    fn wgs84() -> Self {
        let e2 = E * E;
        let e3 = e2 * E;
        let sqrt_e = (1.0 - E).sqrt();
        let n = (1.0 - sqrt_e) / (1.0 + sqrt_e);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;

        Self {
            e_p2: E / (1.0 - E),
            m1: 1.0 - E / 4.0 - 3.0 * e2 / 64.0 - 5.0 * e3 / 256.0,
            m2: 3.0 * E / 8.0 + 3.0 * e2 / 32.0 + 45.0 * e3 / 1024.0,
            m3: 15.0 * e2 / 256.0 + 45.0 * e3 / 1024.0,
            m4: 35.0 * e3 / 3072.0,
            p2: 3.0 / 2.0 * n - 27.0 / 32.0 * n3 + 269.0 / 512.0 * n5,
            p3: 21.0 / 16.0 * n2 - 55.0 / 32.0 * n4,
            p4: 151.0 / 96.0 * n3 - 417.0 / 128.0 * n5,
            p5: 1097.0 / 512.0 * n4,
        }
    }
}

/// Central meridian of a zone in degrees.
pub fn central_longitude(zone_number: u8) -> f64 {
    (zone_number as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

/// Zone number for a geographic point, including the Norway and Svalbard exceptions.
pub fn zone_number(lat: f64, lon: f64) -> u8 {
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }

    if (72.0..=84.0).contains(&lat) && lon >= 0.0 {
        if lon < 9.0 {
            return 31;
        } else if lon < 21.0 {
            return 33;
        } else if lon < 33.0 {
            return 35;
        } else if lon < 42.0 {
            return 37;
        }
    }

    // 180 degrees belongs to zone 60, not a 61st zone
    let lon = if lon == 180.0 { 179.999_999 } else { lon };
    (((lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u8
}

/// Latitude band letter, or `None` outside the UTM latitude limits.
pub fn zone_letter(lat: f64) -> Option<char> {
    if !(-80.0..=84.0).contains(&lat) {
        return None;
    }
    // Band X stretches to 84N, so the last index is clamped onto it
    let index = (((lat + 80.0) / 8.0).floor() as usize).min(ZONE_LETTERS.len() - 1);
    ZONE_LETTERS.chars().nth(index)
}

/// Wrap an angle in radians into [-PI, PI).
fn wrap_angle(value: f64) -> f64 {
    (value + PI).rem_euclid(2.0 * PI) - PI
}

/// Convert a UTM coordinate to geographic (lat, lon) degrees.
pub fn to_lat_lon(easting: f64, northing: f64, zone: UtmZone) -> Result<(f64, f64), ProjectionError> {
    if !(100_000.0..1_000_000.0).contains(&easting) {
        return Err(ProjectionError::InvalidUtm(format!(
            "easting {} outside [100000, 1000000)",
            easting
        )));
    }
    if !(0.0..=10_000_000.0).contains(&northing) {
        return Err(ProjectionError::InvalidUtm(format!(
            "northing {} outside [0, 10000000]",
            northing
        )));
    }

    let ell = Ellipsoid::wgs84();

    let x = easting - FALSE_EASTING;
    let y = if zone.is_northern() {
        northing
    } else {
        northing - FALSE_NORTHING_SOUTH
    };

    let m = y / K0;
    let mu = m / (R * ell.m1);

    // Footpoint latitude
    let p_rad = mu
        + ell.p2 * (2.0 * mu).sin()
        + ell.p3 * (4.0 * mu).sin()
        + ell.p4 * (6.0 * mu).sin()
        + ell.p5 * (8.0 * mu).sin();

    let p_sin = p_rad.sin();
    let p_sin2 = p_sin * p_sin;
    let p_cos = p_rad.cos();
    let p_tan = p_sin / p_cos;
    let p_tan2 = p_tan * p_tan;
    let p_tan4 = p_tan2 * p_tan2;

    let ep_sin = 1.0 - E * p_sin2;
    let ep_sin_sqrt = ep_sin.sqrt();

    let n = R / ep_sin_sqrt;
    let r = (1.0 - E) / ep_sin;

    let c = ell.e_p2 * p_cos * p_cos;
    let c2 = c * c;

    let d = x / (n * K0);
    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    let latitude = p_rad
        - (p_tan / r)
            * (d2 / 2.0 - d4 / 24.0 * (5.0 + 3.0 * p_tan2 + 10.0 * c - 4.0 * c2 - 9.0 * ell.e_p2)
                + d6 / 720.0
                    * (61.0 + 90.0 * p_tan2 + 298.0 * c + 45.0 * p_tan4 - 252.0 * ell.e_p2 - 3.0 * c2));

    let longitude = (d - d3 / 6.0 * (1.0 + 2.0 * p_tan2 + c)
        + d5 / 120.0 * (5.0 - 2.0 * c + 28.0 * p_tan2 - 3.0 * c2 + 8.0 * ell.e_p2 + 24.0 * p_tan4))
        / p_cos;
    let longitude = wrap_angle(longitude + central_longitude(zone.number).to_radians());

    Ok((latitude.to_degrees(), longitude.to_degrees()))
}

/// Convert geographic degrees to UTM.
///
/// The zone is derived from the point unless `force_zone` is given, in which
/// case the point is projected into that zone's grid.
pub fn from_lat_lon(
    lat: f64,
    lon: f64,
    force_zone: Option<UtmZone>,
) -> Result<UtmCoord, ProjectionError> {
    if !(-80.0..=84.0).contains(&lat) {
        return Err(ProjectionError::InvalidUtm(format!(
            "latitude {} outside [-80, 84]",
            lat
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ProjectionError::InvalidUtm(format!(
            "longitude {} outside [-180, 180]",
            lon
        )));
    }

    let zone = match force_zone {
        Some(zone) => zone,
        None => {
            let letter = zone_letter(lat).ok_or_else(|| {
                ProjectionError::InvalidUtm(format!("no band letter for latitude {}", lat))
            })?;
            UtmZone {
                number: zone_number(lat, lon),
                letter,
            }
        }
    };

    let ell = Ellipsoid::wgs84();

    let lat_rad = lat.to_radians();
    let lat_sin = lat_rad.sin();
    let lat_cos = lat_rad.cos();
    let lat_tan = lat_sin / lat_cos;
    let lat_tan2 = lat_tan * lat_tan;
    let lat_tan4 = lat_tan2 * lat_tan2;

    let central_lon_rad = central_longitude(zone.number).to_radians();

    let n = R / (1.0 - E * lat_sin * lat_sin).sqrt();
    let c = ell.e_p2 * lat_cos * lat_cos;

    let a = lat_cos * wrap_angle(lon.to_radians() - central_lon_rad);
    let a2 = a * a;
    let a3 = a2 * a;
    let a4 = a3 * a;
    let a5 = a4 * a;
    let a6 = a5 * a;

    let m = R
        * (ell.m1 * lat_rad - ell.m2 * (2.0 * lat_rad).sin() + ell.m3 * (4.0 * lat_rad).sin()
            - ell.m4 * (6.0 * lat_rad).sin());

    let easting = K0
        * n
        * (a + a3 / 6.0 * (1.0 - lat_tan2 + c)
            + a5 / 120.0 * (5.0 - 18.0 * lat_tan2 + lat_tan4 + 72.0 * c - 58.0 * ell.e_p2))
        + FALSE_EASTING;

    let mut northing = K0
        * (m + n
            * lat_tan
            * (a2 / 2.0
                + a4 / 24.0 * (5.0 - lat_tan2 + 9.0 * c + 4.0 * c * c)
                + a6 / 720.0 * (61.0 - 58.0 * lat_tan2 + lat_tan4 + 600.0 * c - 330.0 * ell.e_p2)));
    if !zone.is_northern() {
        northing += FALSE_NORTHING_SOUTH;
    }

    Ok(UtmCoord {
        easting,
        northing,
        zone,
    })
}

/// Geographic (lat, lon) of a region's upper-left and lower-right corners.
pub fn region_corners(
    region: &GeographicRegion,
) -> Result<((f64, f64), (f64, f64)), ProjectionError> {
    let zone = region.zone();
    let (ul_east, ul_north) = region.upper_left();
    let (lr_east, lr_north) = region.lower_right();
    Ok((
        to_lat_lon(ul_east, ul_north, zone)?,
        to_lat_lon(lr_east, lr_north, zone)?,
    ))
}
