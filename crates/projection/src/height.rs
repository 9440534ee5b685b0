//! Scene height envelope.

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::rpc::RpcModel;

/// Inclusive height interval in meters above the ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    pub min: f64,
    pub max: f64,
}

impl HeightRange {
    /// Union of every model's normalization interval `alt_off ± |alt_scale|`.
    ///
    /// Computed once per dataset and shared by all regions, so a footprint is
    /// bounded for any terrain height the cameras were fitted over.
    pub fn estimate<'a, I>(models: I) -> Result<Self, ProjectionError>
    where
        I: IntoIterator<Item = &'a RpcModel>,
    {
        models
            .into_iter()
            .map(|rpc| {
                let half = rpc.alt_scale.abs();
                Self {
                    min: rpc.alt_off - half,
                    max: rpc.alt_off + half,
                }
            })
            .reduce(|acc, next| Self {
                min: acc.min.min(next.min),
                max: acc.max.max(next.max),
            })
            .ok_or(ProjectionError::EmptyModelSet)
    }

    pub fn contains(&self, height: f64) -> bool {
        height >= self.min && height <= self.max
    }
}
