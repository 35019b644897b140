//! Error types for georeference construction and parsing.

use thiserror::Error;

/// Result type alias using GeorefError.
pub type GeorefResult<T> = Result<T, GeorefError>;

/// A georeference that cannot describe a north-up, axis-aligned raster.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeorefError {
    #[error("world file has {found} tokens, expected at least 6")]
    MissingTokens { found: usize },

    #[error("world file token {index} is not a number: {token:?}")]
    MalformedToken { index: usize, token: String },

    #[error("pixel size must be a positive, finite number of degrees, got {0}")]
    InvalidPixelSize(f64),

    #[error("origin must be finite, got lng={lng}, lat={lat}")]
    NonFiniteOrigin { lng: f64, lat: f64 },
}
