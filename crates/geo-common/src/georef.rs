//! Georeferencing: mapping between raster pixel space and geographic space.
//!
//! Only translation plus a uniform scale is supported. Pixel `(0, 0)` is the
//! top-left cell, its top-left corner sits at `(origin_lat, origin_lng)`, rows
//! grow southward and columns grow eastward.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bbox::BoundingBox;
use crate::coord::LatLng;
use crate::error::{GeorefError, GeorefResult};

/// Minimum number of tokens in a world file.
pub const WORLD_FILE_MIN_TOKENS: usize = 6;

const TOKEN_PIXEL_SIZE: usize = 0;
const TOKEN_ROTATION_Y: usize = 1;
const TOKEN_ROTATION_X: usize = 2;
const TOKEN_ORIGIN_LNG: usize = 4;
const TOKEN_ORIGIN_LAT: usize = 5;

/// Offsets within this fraction of a pixel of an integer are treated as
/// landing exactly on a pixel edge.
const EDGE_SNAP_TOLERANCE: f64 = 1e-9;

/// Position of the raster in geographic space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Georeference {
    origin_lng: f64,
    origin_lat: f64,
    pixel_size_deg: f64,
}

/// Size of a loaded raster. Both sides are at least one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RasterDimensions {
    width: u32,
    height: u32,
}

/// Row/column of a pixel, row 0 being the northernmost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelIndex {
    pub row: u32,
    pub col: u32,
}

impl PixelIndex {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl RasterDimensions {
    /// Returns `None` when either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Georeference {
    /// Create a georeference from the top-left corner and the pixel size.
    pub fn new(origin_lng: f64, origin_lat: f64, pixel_size_deg: f64) -> GeorefResult<Self> {
        if !(pixel_size_deg.is_finite() && pixel_size_deg > 0.0) {
            return Err(GeorefError::InvalidPixelSize(pixel_size_deg));
        }
        if !(origin_lng.is_finite() && origin_lat.is_finite()) {
            return Err(GeorefError::NonFiniteOrigin {
                lng: origin_lng,
                lat: origin_lat,
            });
        }

        Ok(Self {
            origin_lng,
            origin_lat,
            pixel_size_deg,
        })
    }

    /// Parse a world file.
    ///
    /// Tokens are whitespace separated and read by position: 0 is the pixel
    /// size, 4 the origin longitude, 5 the origin latitude. Tokens 1 to 3
    /// (rotation terms and the signed row size) are not used.
    pub fn from_world_file(text: &str) -> GeorefResult<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < WORLD_FILE_MIN_TOKENS {
            return Err(GeorefError::MissingTokens {
                found: tokens.len(),
            });
        }

        let field = |index: usize| -> GeorefResult<f64> {
            tokens[index]
                .parse::<f64>()
                .map_err(|_| GeorefError::MalformedToken {
                    index,
                    token: tokens[index].to_string(),
                })
        };

        let pixel_size = field(TOKEN_PIXEL_SIZE)?;
        let origin_lng = field(TOKEN_ORIGIN_LNG)?;
        let origin_lat = field(TOKEN_ORIGIN_LAT)?;

        let rotated = [TOKEN_ROTATION_Y, TOKEN_ROTATION_X]
            .into_iter()
            .filter_map(|index| tokens[index].parse::<f64>().ok())
            .any(|term| term != 0.0);
        if rotated {
            warn!(
                rotation_y = tokens[TOKEN_ROTATION_Y],
                rotation_x = tokens[TOKEN_ROTATION_X],
                "World file has rotation terms, ignoring them"
            );
        }

        Self::new(origin_lng, origin_lat, pixel_size)
    }

    pub fn origin_lng(&self) -> f64 {
        self.origin_lng
    }

    pub fn origin_lat(&self) -> f64 {
        self.origin_lat
    }

    pub fn pixel_size_deg(&self) -> f64 {
        self.pixel_size_deg
    }

    /// Geographic footprint of a raster with the given dimensions.
    pub fn bounding_box(&self, dims: RasterDimensions) -> BoundingBox {
        BoundingBox {
            min_lng: self.origin_lng,
            max_lng: self.origin_lng + self.pixel_size_deg * dims.width as f64,
            max_lat: self.origin_lat,
            min_lat: self.origin_lat - self.pixel_size_deg * dims.height as f64,
        }
    }

    /// Transform a coordinate into the pixel that contains it.
    ///
    /// Each axis is `floor((origin - coord) / pixel_size)`, except that an
    /// offset less than 1e-9 of a pixel short of the next integer counts as
    /// that integer. A coordinate that close to the north or west edge of a
    /// pixel therefore lands in that pixel, so pixel corners computed with
    /// [`Self::pixel_corner`] map back to their own pixel despite rounding.
    ///
    /// The result is clamped into the raster, so a coordinate on the southern
    /// or eastern edge maps to the last row or column. Callers are expected
    /// to have bounds-checked `coord` against [`Self::bounding_box`].
    pub fn pixel_index(&self, coord: LatLng, dims: RasterDimensions) -> PixelIndex {
        let row = (self.origin_lat - coord.lat) / self.pixel_size_deg;
        let col = (coord.lng - self.origin_lng) / self.pixel_size_deg;

        PixelIndex {
            row: axis_index(row, dims.height),
            col: axis_index(col, dims.width),
        }
    }

    /// Coordinate of the top-left corner of a pixel.
    pub fn pixel_corner(&self, index: PixelIndex) -> LatLng {
        LatLng {
            lat: self.origin_lat - index.row as f64 * self.pixel_size_deg,
            lng: self.origin_lng + index.col as f64 * self.pixel_size_deg,
        }
    }
}

/// Floor a fractional pixel offset and clamp it to `[0, len - 1]`.
///
/// Only an offset just below an integer is moved; anything at or above one
/// already floors to it.
fn axis_index(offset: f64, len: u32) -> u32 {
    let floored = offset.floor();
    let cell = if offset - floored > 1.0 - EDGE_SNAP_TOLERANCE {
        floored + 1.0
    } else {
        floored
    };

    let last = len.saturating_sub(1);
    if cell <= 0.0 || cell.is_nan() {
        0
    } else if cell >= last as f64 {
        last
    } else {
        cell as u32
    }
}
