//! Common types and utilities shared across the sat-tiler crates.

pub mod bbox;
pub mod error;
pub mod region;
pub mod time;

pub use bbox::{evaluate_coverage, Coverage, PixelRect, MAX_PIXEL_COORD};
pub use error::{Result, TilerError};
pub use region::{GeographicRegion, UtmZone};
pub use time::{format_capture_time, parse_capture_time, tile_key};
