//! 3D sampling lattices used to bound a camera footprint.

use tile_common::GeographicRegion;

use crate::error::ProjectionError;
use crate::height::HeightRange;
use crate::utm;

/// A regular lattice of (lat, lon, height) points, flattened into parallel arrays.
///
/// Only the corners of the region are sampled, crossed with both height
/// extremes. This bounds the footprint as long as the RPC model is close to
/// monotonic over the region, which holds for typical satellite scenes.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingGrid {
    lat: Vec<f64>,
    lon: Vec<f64>,
    height: Vec<f64>,
}

impl SamplingGrid {
    /// Cartesian product of the given coordinate values.
    ///
    /// Latitude varies slowest and height fastest.
    pub fn from_ranges(lat: &[f64], lon: &[f64], height: &[f64]) -> Self {
        let len = lat.len() * lon.len() * height.len();
        let mut grid = Self {
            lat: Vec::with_capacity(len),
            lon: Vec::with_capacity(len),
            height: Vec::with_capacity(len),
        };

        for &la in lat {
            for &lo in lon {
                for &h in height {
                    grid.lat.push(la);
                    grid.lon.push(lo);
                    grid.height.push(h);
                }
            }
        }
        grid
    }

    /// Grid over a UTM region's corners and the shared height envelope.
    pub fn for_region(
        region: &GeographicRegion,
        heights: HeightRange,
    ) -> Result<Self, ProjectionError> {
        let ((ul_lat, ul_lon), (lr_lat, lr_lon)) = utm::region_corners(region)?;
        Ok(Self::from_ranges(
            &[ul_lat, lr_lat],
            &[ul_lon, lr_lon],
            &[heights.min, heights.max],
        ))
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    pub fn height(&self) -> &[f64] {
        &self.height
    }

    /// Number of points in the lattice.
    pub fn len(&self) -> usize {
        self.lat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }
}
