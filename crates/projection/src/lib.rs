//! Camera and map projections for satellite scenes.
//!
//! Implements the rational polynomial camera model and UTM conversion from
//! scratch without external dependencies, plus the sampling helpers used to
//! bound a camera's footprint over a region.

pub mod error;
pub mod grid;
pub mod height;
pub mod rpc;
pub mod utm;

pub use error::ProjectionError;
pub use grid::SamplingGrid;
pub use height::HeightRange;
pub use rpc::{RpcModel, RPC_COEFFICIENTS};
pub use utm::{from_lat_lon, to_lat_lon, UtmCoord};
