//! Results of planning and cutting a region.

use std::path::PathBuf;

use serde::Serialize;
use tile_common::{GeographicRegion, PixelRect};

use crate::decision::{ImageAssessment, ImageDecision};

/// One emitted tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    /// Sequential output index, in acceptance order
    pub index: usize,
    /// `{index:03}_{capture time}` shared by the three artifacts
    pub key: String,
    /// Position of the source image in capture-time order
    pub image_index: usize,
    pub source: PathBuf,
    pub window: PixelRect,
    pub overlap_ratio: f64,
    pub image_path: PathBuf,
    pub meta_path: PathBuf,
    pub region_path: PathBuf,
}

/// Number of images in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionCounts {
    pub accepted: usize,
    pub rejected_cloudy: usize,
    pub rejected_low_coverage: usize,
    pub pending: usize,
}

impl DecisionCounts {
    pub fn tally(assessments: &[ImageAssessment]) -> Self {
        let mut counts = Self::default();
        for assessment in assessments {
            match assessment.decision {
                ImageDecision::Pending => counts.pending += 1,
                ImageDecision::RejectedCloudy { .. } => counts.rejected_cloudy += 1,
                ImageDecision::RejectedLowCoverage { .. } => counts.rejected_low_coverage += 1,
                ImageDecision::Accepted { .. } => counts.accepted += 1,
            }
        }
        counts
    }
}

/// Outcome of the filtering pass over one region. Nothing is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPlan {
    pub region: GeographicRegion,
    /// One entry per dataset image, in capture-time order
    pub assessments: Vec<ImageAssessment>,
    pub cancelled: bool,
}

impl RegionPlan {
    /// Accepted images in capture-time order, i.e. output index order.
    pub fn accepted(&self) -> impl Iterator<Item = (usize, PixelRect, f64)> + '_ {
        self.assessments
            .iter()
            .filter_map(|assessment| match assessment.decision {
                ImageDecision::Accepted {
                    window,
                    overlap_ratio,
                } => Some((assessment.index, window, overlap_ratio)),
                _ => None,
            })
    }

    pub fn counts(&self) -> DecisionCounts {
        DecisionCounts::tally(&self.assessments)
    }
}

/// Outcome of cutting one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    pub region: GeographicRegion,
    /// Emitted tiles in index order
    pub tiles: Vec<Tile>,
    pub assessments: Vec<ImageAssessment>,
    pub cancelled: bool,
}

impl RegionReport {
    pub fn counts(&self) -> DecisionCounts {
        DecisionCounts::tally(&self.assessments)
    }
}
