//! Per-image decision state machine.
//!
//! Every (image, region) pair starts `Pending` and moves to exactly one
//! terminal state. Terminal states are final; a rejected image is never
//! revisited for the same region.

use serde::{Deserialize, Serialize};
use tile_common::PixelRect;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ImageDecision {
    /// Not evaluated, e.g. because the region was cancelled first
    Pending,
    RejectedCloudy { cloud_cover: f64 },
    RejectedLowCoverage { overlap_ratio: f64 },
    /// The image is cut; `window` is the footprint clamped to the image
    Accepted { window: PixelRect, overlap_ratio: f64 },
}

impl ImageDecision {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ImageDecision::Pending)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ImageDecision::Accepted { .. })
    }

    /// Crop window of an accepted image.
    pub fn window(&self) -> Option<PixelRect> {
        match self {
            ImageDecision::Accepted { window, .. } => Some(*window),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageDecision::Pending => "pending",
            ImageDecision::RejectedCloudy { .. } => "rejected_cloudy",
            ImageDecision::RejectedLowCoverage { .. } => "rejected_low_coverage",
            ImageDecision::Accepted { .. } => "accepted",
        }
    }
}

/// Decision for one dataset image, by its position in capture-time order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageAssessment {
    pub index: usize,
    pub decision: ImageDecision,
}
