//! Tile cutting for satellite scene archives.
//!
//! Turns a geographic region plus a directory of raw scenes into a clean
//! per-tile dataset: every scene that is clear enough and sees enough of the
//! region is cropped to the region's footprint, tone mapped, and written with
//! a camera model re-expressed in the crop's pixel frame.
//!
//! # Architecture
//!
//! - [`TileCutter`] drives one region at a time: a sequential filtering pass
//!   in capture-time order, then (optionally parallel) staging of the
//!   accepted tiles, then in-order commits.
//! - [`ImageDecision`] is the per-image state machine.
//! - [`OutputLayout`] owns the on-disk layout and is initialized explicitly.

pub mod config;
pub mod cutter;
pub mod decision;
pub mod layout;
pub mod report;
mod staging;

// Re-exports
pub use config::CutterConfig;
pub use cutter::TileCutter;
pub use decision::{ImageAssessment, ImageDecision};
pub use layout::OutputLayout;
pub use report::{DecisionCounts, RegionPlan, RegionReport, Tile};
