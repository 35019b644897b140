//! Common geographic types shared across the georaster workspace.
//!
//! Everything here is plain data and pure arithmetic: no I/O, no async.

pub mod bbox;
pub mod coord;
pub mod error;
pub mod georef;

pub use bbox::{BoundingBox, EdgePolicy};
pub use coord::{LatLng, ToLatLng};
pub use error::{GeorefError, GeorefResult};
pub use georef::{Georeference, PixelIndex, RasterDimensions, WORLD_FILE_MIN_TOKENS};
