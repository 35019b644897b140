//! Shared test utilities for the georaster workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic raster generators with predictable pixel values
//! - World file text generators
//! - Canonical georeference fixtures
//! - Temporary on-disk fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{create_test_png, fixtures, TempFixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f64, 1.0_f64, 0.001_f64);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality for anything with `lat` and `lng` fields.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_lat_lng_approx_eq;
///
/// assert_lat_lng_approx_eq!(corner, (50.0, 10.0), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_lat_lng_approx_eq {
    ($coord:expr, ($lat:expr, $lng:expr), $epsilon:expr) => {{
        let coord = $coord;
        $crate::assert_approx_eq!(coord.lat, $lat, $epsilon);
        $crate::assert_approx_eq!(coord.lng, $lng, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    struct Point {
        lat: f64,
        lng: f64,
    }

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_lat_lng_approx_eq_passes() {
        let point = Point {
            lat: 50.0000001,
            lng: 9.9999999,
        };
        assert_lat_lng_approx_eq!(point, (50.0, 10.0), 1e-6);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_lat_lng_approx_eq_fails() {
        let point = Point { lat: 51.0, lng: 10.0 };
        assert_lat_lng_approx_eq!(point, (50.0, 10.0), 1e-6);
    }
}
