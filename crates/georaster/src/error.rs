//! Error types for raster loading and sampling.

use std::fmt;
use std::time::Duration;

use geo_common::{BoundingBox, GeorefError};
use thiserror::Error;

/// The two independently loaded inputs of a [`GeoRaster`](crate::GeoRaster).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    Raster,
    Georeference,
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Raster => write!(f, "raster"),
            Input::Georeference => write!(f, "georeference"),
        }
    }
}

/// Why an input could not be loaded. Failures are permanent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The bytes could not be fetched (IO, network, object store).
    #[error("failed to fetch {source_id}: {message}")]
    Fetch { source_id: String, message: String },

    /// The raster bytes are not a decodable image.
    #[error("failed to decode raster: {0}")]
    Decode(String),

    /// The decoded raster has no pixels.
    #[error("raster has no pixels ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    /// The world file does not describe a usable georeference.
    #[error("malformed georeference: {0}")]
    Malformed(#[from] GeorefError),

    /// The load task ended without producing an outcome (panic or cancellation).
    #[error("load task failed: {0}")]
    TaskFailed(String),

    /// The load did not finish within the configured timeout.
    #[error("{input} did not load within {after:?}")]
    Timeout { input: Input, after: Duration },
}

impl LoadError {
    /// Create a Fetch error for the given source.
    pub fn fetch(source_id: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Fetch {
            source_id: source_id.into(),
            message: err.to_string(),
        }
    }
}

impl From<image::ImageError> for LoadError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// A permanently failed input, as reported to callers.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{input} failed to load: {error}")]
pub struct LoadFailure {
    pub input: Input,
    pub error: LoadError,
}

/// Outcome of a point query that did not produce a pixel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// At least one input is still loading. Retry later.
    #[error("raster is not ready yet")]
    NotReady,

    /// The coordinate lies outside the raster footprint.
    #[error("location (lat={lat}, lng={lng}) is outside raster bounds {bbox}")]
    OutOfBounds { lat: f64, lng: f64, bbox: BoundingBox },

    /// An input failed to load; the raster will never become ready.
    #[error(transparent)]
    Unavailable(#[from] LoadFailure),
}

impl SampleError {
    /// Whether the same query may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SampleError::NotReady)
    }
}

/// Errors raised synchronously while constructing a [`GeoRaster`](crate::GeoRaster).
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no georeference given")]
    MissingGeoreference,

    #[error("must be opened from within a Tokio runtime")]
    NoRuntime,

    #[error(transparent)]
    Georeference(#[from] GeorefError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_not_ready_is_retryable() {
        assert!(SampleError::NotReady.is_retryable());
        assert!(!SampleError::OutOfBounds {
            lat: 0.0,
            lng: 0.0,
            bbox: BoundingBox::new(1.0, 1.0, 2.0, 2.0),
        }
        .is_retryable());
        assert!(!SampleError::Unavailable(LoadFailure {
            input: Input::Raster,
            error: LoadError::Decode("bad".to_string()),
        })
        .is_retryable());
    }

    #[test]
    fn test_failure_message_names_input() {
        let failure = LoadFailure {
            input: Input::Georeference,
            error: LoadError::fetch("raster.pgw", "connection refused"),
        };
        assert_eq!(
            failure.to_string(),
            "georeference failed to load: failed to fetch raster.pgw: connection refused"
        );
    }

    #[test]
    fn test_malformed_from_georef_error() {
        let err: LoadError = GeorefError::MissingTokens { found: 2 }.into();
        assert!(matches!(err, LoadError::Malformed(_)));
    }
}
