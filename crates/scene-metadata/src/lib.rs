//! Satellite scene metadata.
//!
//! Parses the XML sidecars that accompany raw satellite rasters, holds the
//! per-image records used by the tile cutter, and discovers a dataset of
//! raster/sidecar pairs on disk.
//!
//! # Architecture
//!
//! - [`xml`] reads WorldView-style `IMD`/`RPB` sidecars
//! - [`record`] is the JSON metadata record written next to every tile
//! - [`dataset`] pairs rasters with sidecars and orders them by capture time

pub mod dataset;
pub mod record;
pub mod xml;

// Re-exports
pub use dataset::{Dataset, DatasetOptions, RawImage};
pub use record::ImageMetadata;
pub use xml::{parse_metadata, parse_metadata_str};
