//! Pixel-space rectangles and coverage evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TilerError};

/// Largest magnitude a projected pixel coordinate may take.
///
/// Cameras extrapolated far outside their valid domain can project to
/// arbitrarily large coordinates; anything beyond this bound is bad data.
pub const MAX_PIXEL_COORD: f64 = (1u64 << 40) as f64;

/// An integer pixel rectangle within one image's pixel space.
///
/// The rectangle spans columns `col..col + width` and rows `row..row + height`
/// (half-open). Origins may be negative while a footprint is still a
/// candidate; crop windows produced by [`evaluate_coverage`] never are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub col: i64,
    pub row: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelRect {
    /// The empty rectangle reported when two rectangles do not intersect.
    pub const EMPTY: PixelRect = PixelRect {
        col: 0,
        row: 0,
        width: 0,
        height: 0,
    };

    pub fn new(col: i64, row: i64, width: i64, height: i64) -> Self {
        Self {
            col,
            row,
            width,
            height,
        }
    }

    /// Full extent of an image with the given pixel dimensions.
    pub fn full_extent(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i64, height as i64)
    }

    /// Axis-aligned bounding box of projected pixel coordinates.
    ///
    /// Extremes are rounded half-to-even (matching the usual numeric-library
    /// `round`), then width and height are derived inclusively as
    /// `max - min + 1`. Non-finite coordinates, and coordinates beyond
    /// [`MAX_PIXEL_COORD`], are rejected.
    pub fn bounding(cols: &[f64], rows: &[f64]) -> Result<Self> {
        if cols.is_empty() || cols.len() != rows.len() {
            return Err(TilerError::InvalidRegion(format!(
                "cannot bound {} columns against {} rows",
                cols.len(),
                rows.len()
            )));
        }

        let mut min_col = f64::INFINITY;
        let mut max_col = f64::NEG_INFINITY;
        let mut min_row = f64::INFINITY;
        let mut max_row = f64::NEG_INFINITY;
        for (&c, &r) in cols.iter().zip(rows) {
            if !c.is_finite() || !r.is_finite() {
                return Err(TilerError::Data(format!(
                    "projected pixel coordinate is not finite: ({}, {})",
                    c, r
                )));
            }
            min_col = min_col.min(c);
            max_col = max_col.max(c);
            min_row = min_row.min(r);
            max_row = max_row.max(r);
        }

        let ul_col = pixel_index(min_col)?;
        let ul_row = pixel_index(min_row)?;
        let width = pixel_index(max_col)? - ul_col + 1;
        let height = pixel_index(max_row)? - ul_row + 1;

        Ok(Self::new(ul_col, ul_row, width, height))
    }

    /// One past the last column.
    pub fn right(&self) -> i64 {
        self.col.saturating_add(self.width)
    }

    /// One past the last row.
    pub fn bottom(&self) -> i64 {
        self.row.saturating_add(self.height)
    }

    /// Pixel count, widened so any pair of `i64` sides fits.
    pub fn area(&self) -> i128 {
        self.width.max(0) as i128 * self.height.max(0) as i128
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if this rectangle shares at least one pixel with another.
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.col.max(other.col) < self.right().min(other.right())
            && self.row.max(other.row) < self.bottom().min(other.bottom())
    }

    /// Compute the intersection of two rectangles.
    pub fn intersection(&self, other: &PixelRect) -> Option<PixelRect> {
        if !self.intersects(other) {
            return None;
        }

        let col = self.col.max(other.col);
        let row = self.row.max(other.row);
        Some(PixelRect {
            col,
            row,
            width: self.right().min(other.right()).saturating_sub(col),
            height: self.bottom().min(other.bottom()).saturating_sub(row),
        })
    }

    /// Check if `other` lies entirely within this rectangle.
    pub fn contains(&self, other: &PixelRect) -> bool {
        other.col >= self.col
            && other.row >= self.row
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[col {}, row {}, {}x{}]",
            self.col, self.row, self.width, self.height
        )
    }
}

/// Round a projected coordinate to its pixel index, half to even.
fn pixel_index(coord: f64) -> Result<i64> {
    let rounded = coord.round_ties_even();
    if rounded.abs() > MAX_PIXEL_COORD {
        return Err(TilerError::Data(format!(
            "projected pixel coordinate {} is outside +/-{}",
            coord, MAX_PIXEL_COORD
        )));
    }
    Ok(rounded as i64)
}

/// Outcome of comparing a candidate footprint against an image extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub has_intersection: bool,
    /// Intersection of the two rectangles; [`PixelRect::EMPTY`] when disjoint.
    pub intersection: PixelRect,
    /// `area(intersection) / area(candidate)`
    pub overlap_ratio: f64,
}

/// Evaluate how much of `candidate` is visible inside `full_extent`.
///
/// The ratio is taken over the candidate's area only, so an image much
/// larger than the footprint still scores 1.0 when it contains it.
pub fn evaluate_coverage(full_extent: &PixelRect, candidate: &PixelRect) -> Result<Coverage> {
    if candidate.is_empty() {
        return Err(TilerError::InvalidRegion(format!(
            "candidate window {}x{} has zero area",
            candidate.width, candidate.height
        )));
    }

    match full_extent.intersection(candidate) {
        Some(intersection) => Ok(Coverage {
            has_intersection: true,
            intersection,
            overlap_ratio: intersection.area() as f64 / candidate.area() as f64,
        }),
        None => Ok(Coverage {
            has_intersection: false,
            intersection: PixelRect::EMPTY,
            overlap_ratio: 0.0,
        }),
    }
}
