//! Error types for tiling operations.

use std::path::Path;
use thiserror::Error;

/// Result type alias using TilerError.
pub type Result<T> = std::result::Result<T, TilerError>;

/// Primary error type for the tiling pipeline.
///
/// `Config` and `Data` raised during setup abort the whole run. `Io` raised
/// while writing a tile aborts the region being cut.
#[derive(Debug, Error)]
pub enum TilerError {
    // === Setup Errors ===
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    Data(String),

    // === I/O Errors ===
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    // === Geometry Errors ===
    #[error("Invalid region: {0}")]
    InvalidRegion(String),
}

impl TilerError {
    /// Build an I/O error tagged with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, message: impl ToString) -> Self {
        TilerError::Io {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Whether this error must abort the entire run rather than one region.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, TilerError::Config(_) | TilerError::Data(_))
    }
}

impl From<std::io::Error> for TilerError {
    fn from(err: std::io::Error) -> Self {
        TilerError::Io {
            path: "<unknown>".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TilerError {
    fn from(err: serde_json::Error) -> Self {
        TilerError::Data(format!("JSON error: {}", err))
    }
}
