//! Common test fixtures for georaster tests.
//!
//! Each fixture is a georeference (origin longitude, origin latitude, pixel
//! size in degrees) plus raster dimensions.

/// A georeferenced raster layout used across the test suite.
#[derive(Debug, Clone, Copy)]
pub struct RasterSpec {
    pub origin_lng: f64,
    pub origin_lat: f64,
    pub pixel_size: f64,
    pub width: u32,
    pub height: u32,
}

impl RasterSpec {
    /// Returns the bounding box as (min_lng, min_lat, max_lng, max_lat).
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        (
            self.origin_lng,
            self.origin_lat - self.pixel_size * self.height as f64,
            self.origin_lng + self.pixel_size * self.width as f64,
            self.origin_lat,
        )
    }

    /// Encoded RGBA PNG for this layout.
    pub fn png(&self) -> Vec<u8> {
        crate::create_test_png(self.width, self.height)
    }

    /// World file text for this layout.
    pub fn world_file(&self) -> String {
        crate::create_world_file(self.origin_lng, self.origin_lat, self.pixel_size)
    }
}

/// 2x2 raster at 10°E 50°N with one-degree pixels; covers lng 10..12, lat 48..50.
pub const TWO_BY_TWO: RasterSpec = RasterSpec {
    origin_lng: 10.0,
    origin_lat: 50.0,
    pixel_size: 1.0,
    width: 2,
    height: 2,
};

/// Non-square raster with a pixel size that is not exactly representable.
pub const IBERIA_TENTH: RasterSpec = RasterSpec {
    origin_lng: -9.5,
    origin_lat: 43.8,
    pixel_size: 0.1,
    width: 13,
    height: 7,
};

/// Raster straddling the prime meridian and the equator.
pub const GULF_OF_GUINEA: RasterSpec = RasterSpec {
    origin_lng: -2.0,
    origin_lat: 1.5,
    pixel_size: 0.25,
    width: 16,
    height: 12,
};
