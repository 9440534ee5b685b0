//! Rational polynomial camera (RPC) model.
//!
//! Satellite vendors ship an RPC model instead of a physical sensor model.
//! Image row and column are each the ratio of two cubic polynomials in
//! normalized latitude, longitude and height:
//!
//! ```text
//! row = LineNum(P, L, H) / LineDen(P, L, H) * row_scale + row_off
//! col = SampNum(P, L, H) / SampDen(P, L, H) * col_scale + col_off
//! ```
//!
//! Coefficients use the RPC00B term order, where `L` is normalized
//! longitude, `P` normalized latitude and `H` normalized height:
//! `1, L, P, H, LP, LH, PH, L², P², H², PLH, L³, LP², LH², L²P, P³, PH², L²H, P²H, H³`.

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// Number of coefficients in each RPC polynomial.
pub const RPC_COEFFICIENTS: usize = 20;

/// RPC camera parameters.
///
/// Field names serialize in the camelCase form of the per-tile metadata
/// record (`rowOff`, `latScale`, `colNum`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcModel {
    pub row_off: f64,
    pub row_scale: f64,
    pub col_off: f64,
    pub col_scale: f64,
    pub lat_off: f64,
    pub lat_scale: f64,
    pub lon_off: f64,
    pub lon_scale: f64,
    pub alt_off: f64,
    pub alt_scale: f64,
    /// Line (row) numerator coefficients
    pub row_num: [f64; RPC_COEFFICIENTS],
    /// Line (row) denominator coefficients
    pub row_den: [f64; RPC_COEFFICIENTS],
    /// Sample (col) numerator coefficients
    pub col_num: [f64; RPC_COEFFICIENTS],
    /// Sample (col) denominator coefficients
    pub col_den: [f64; RPC_COEFFICIENTS],
}

impl RpcModel {
    /// Check that every normalization scale is usable.
    pub fn validate(&self) -> Result<(), ProjectionError> {
        let scales = [
            ("row", self.row_scale),
            ("col", self.col_scale),
            ("latitude", self.lat_scale),
            ("longitude", self.lon_scale),
            ("height", self.alt_scale),
        ];
        for (name, scale) in scales {
            if scale == 0.0 || !scale.is_finite() {
                return Err(ProjectionError::InvalidScale(name));
            }
        }
        Ok(())
    }

    /// Project parallel arrays of geographic points to pixel coordinates.
    ///
    /// Returns `(col, row)` arrays of the same length as the inputs. Inputs are
    /// not clipped to the normalization domain, so points far outside it give
    /// extrapolated coordinates.
    pub fn project(
        &self,
        lat: &[f64],
        lon: &[f64],
        height: &[f64],
    ) -> Result<(Vec<f64>, Vec<f64>), ProjectionError> {
        if lat.len() != lon.len() || lat.len() != height.len() {
            return Err(ProjectionError::LengthMismatch {
                lat: lat.len(),
                lon: lon.len(),
                height: height.len(),
            });
        }

        let mut cols = Vec::with_capacity(lat.len());
        let mut rows = Vec::with_capacity(lat.len());
        for (index, ((&la, &lo), &h)) in lat.iter().zip(lon).zip(height).enumerate() {
            let (col, row) = self.project_indexed(index, la, lo, h)?;
            cols.push(col);
            rows.push(row);
        }
        Ok((cols, rows))
    }

    /// Project a single point (degrees, meters) to `(col, row)`.
    pub fn project_point(
        &self,
        lat: f64,
        lon: f64,
        height: f64,
    ) -> Result<(f64, f64), ProjectionError> {
        self.project_indexed(0, lat, lon, height)
    }

    fn project_indexed(
        &self,
        index: usize,
        lat: f64,
        lon: f64,
        height: f64,
    ) -> Result<(f64, f64), ProjectionError> {
        let p = (lat - self.lat_off) / self.lat_scale;
        let l = (lon - self.lon_off) / self.lon_scale;
        let h = (height - self.alt_off) / self.alt_scale;

        let row_den = polynomial(&self.row_den, l, p, h);
        let col_den = polynomial(&self.col_den, l, p, h);
        if row_den == 0.0 || col_den == 0.0 {
            return Err(ProjectionError::DivisionByZero {
                index,
                lat,
                lon,
                height,
            });
        }

        let row = polynomial(&self.row_num, l, p, h) / row_den;
        let col = polynomial(&self.col_num, l, p, h) / col_den;

        Ok((
            col * self.col_scale + self.col_off,
            row * self.row_scale + self.row_off,
        ))
    }

    /// Model re-expressed in the local pixel frame of a crop whose upper-left
    /// corner sits at `(col_origin, row_origin)` in this model's frame.
    pub fn shifted(&self, col_origin: f64, row_origin: f64) -> Self {
        Self {
            col_off: self.col_off - col_origin,
            row_off: self.row_off - row_origin,
            ..self.clone()
        }
    }
}

/// Evaluate one cubic RPC00B polynomial.
#[inline]
fn polynomial(c: &[f64; RPC_COEFFICIENTS], l: f64, p: f64, h: f64) -> f64 {
    c[0] + c[1] * l
        + c[2] * p
        + c[3] * h
        + c[4] * l * p
        + c[5] * l * h
        + c[6] * p * h
        + c[7] * l * l
        + c[8] * p * p
        + c[9] * h * h
        + c[10] * p * l * h
        + c[11] * l * l * l
        + c[12] * l * p * p
        + c[13] * l * h * h
        + c[14] * l * l * p
        + c[15] * p * p * p
        + c[16] * p * h * h
        + c[17] * l * l * h
        + c[18] * p * p * h
        + c[19] * h * h * h
}
