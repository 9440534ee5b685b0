//! Geographic regions expressed in UTM coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TilerError};

/// Latitude band letters, south to north. `I` and `O` are skipped.
pub const ZONE_LETTERS: &str = "CDEFGHJKLMNPQRSTUVWX";

/// A UTM grid zone: longitude zone number plus latitude band letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtmZone {
    pub number: u8,
    pub letter: char,
}

impl UtmZone {
    /// Create a zone, validating the number (1-60) and band letter.
    pub fn new(number: u8, letter: char) -> Result<Self> {
        if !(1..=60).contains(&number) {
            return Err(TilerError::Config(format!(
                "UTM zone number must be in 1..=60, got {}",
                number
            )));
        }
        let letter = letter.to_ascii_uppercase();
        if !ZONE_LETTERS.contains(letter) {
            return Err(TilerError::Config(format!(
                "UTM zone letter must be one of {}, got '{}'",
                ZONE_LETTERS, letter
            )));
        }
        Ok(Self { number, letter })
    }

    /// Bands `N` and above lie in the northern hemisphere.
    pub fn is_northern(&self) -> bool {
        self.letter >= 'N'
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.letter)
    }
}

/// A rectangle in a UTM zone, anchored at its upper-left corner.
///
/// This is both the per-tile region record and the area-of-interest
/// descriptor; the serialized keys match the on-disk record format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicRegion {
    pub zone_number: u8,
    pub zone_letter: char,
    /// Upper-left easting (meters)
    pub x: f64,
    /// Upper-left northing (meters)
    pub y: f64,
    /// Width (meters, eastward)
    pub w: f64,
    /// Height (meters, southward)
    pub h: f64,
}

impl GeographicRegion {
    /// Create a region from its upper-left corner and size.
    pub fn new(zone: UtmZone, x: f64, y: f64, w: f64, h: f64) -> Result<Self> {
        let region = Self {
            zone_number: zone.number,
            zone_letter: zone.letter,
            x,
            y,
            w,
            h,
        };
        region.validate()?;
        Ok(region)
    }

    /// Create a region from upper-left and lower-right corners.
    pub fn from_corners(
        zone: UtmZone,
        ul_east: f64,
        ul_north: f64,
        lr_east: f64,
        lr_north: f64,
    ) -> Result<Self> {
        Self::new(zone, ul_east, ul_north, lr_east - ul_east, ul_north - lr_north)
    }

    /// Check the invariants of a region, including one that was deserialized.
    pub fn validate(&self) -> Result<()> {
        UtmZone::new(self.zone_number, self.zone_letter)?;
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(TilerError::Config(format!(
                "region origin must be finite, got ({}, {})",
                self.x, self.y
            )));
        }
        if !(self.w > 0.0) || !(self.h > 0.0) {
            return Err(TilerError::Config(format!(
                "region width and height must be positive, got {} x {}",
                self.w, self.h
            )));
        }
        Ok(())
    }

    pub fn zone(&self) -> UtmZone {
        UtmZone {
            number: self.zone_number,
            letter: self.zone_letter,
        }
    }

    /// Upper-left corner as (easting, northing).
    pub fn upper_left(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Lower-right corner as (easting, northing).
    pub fn lower_right(&self) -> (f64, f64) {
        (self.x + self.w, self.y - self.h)
    }
}

impl fmt::Display for GeographicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} E{:.1} N{:.1} ({:.1} x {:.1} m)",
            self.zone(),
            self.x,
            self.y,
            self.w,
            self.h
        )
    }
}
