//! Projection error types.

use thiserror::Error;
use tile_common::TilerError;

#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("RPC denominator is zero at point {index} (lat {lat}, lon {lon}, height {height})")]
    DivisionByZero {
        index: usize,
        lat: f64,
        lon: f64,
        height: f64,
    },

    #[error("Coordinate arrays differ in length: lat {lat}, lon {lon}, height {height}")]
    LengthMismatch { lat: usize, lon: usize, height: usize },

    #[error("Normalization scale for {0} must be non-zero and finite")]
    InvalidScale(&'static str),

    #[error("Invalid UTM coordinate: {0}")]
    InvalidUtm(String),

    #[error("Cannot estimate a height range from zero camera models")]
    EmptyModelSet,
}

impl From<ProjectionError> for TilerError {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::InvalidUtm(_) => TilerError::Config(err.to_string()),
            _ => TilerError::Data(err.to_string()),
        }
    }
}
