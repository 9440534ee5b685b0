//! Shared test utilities for the sat-tiler workspace.
//!
//! Everything here builds on one synthetic scene geometry: a north-up RPC
//! camera looking at a 0.01 degree square near Boulder, CO. Fixtures give the
//! camera and region, generators put rasters and XML sidecars on disk.

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert two floats differ by at most `epsilon`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        assert!(
            (left - right).abs() <= epsilon,
            "assertion failed: {} and {} differ by more than {}",
            left,
            right,
            epsilon
        );
    }};
}

/// Approximate equality of (lat, lon) or (easting, northing) pairs.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($a1:expr, $b1:expr), ($a2:expr, $b2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($a1, $a2, $epsilon);
        $crate::assert_approx_eq!($b1, $b2, $epsilon);
    }};
}
