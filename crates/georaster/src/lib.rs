//! Point sampling of georeferenced rasters.
//!
//! A [`GeoRaster`] answers "what does the raster hold at (lat, lng)?" for a
//! north-up raster in plain geographic coordinates. Two inputs arrive
//! independently and asynchronously:
//!
//! - the raster itself (fetched and decoded once), and
//! - its georeference, given inline or read from a world file.
//!
//! Queries are rejected with [`SampleError::NotReady`] until both are in.
//!
//! # Architecture
//!
//! ```text
//! GeoRaster::builder(..).open()
//!      │
//!      ├─► spawn: RasterLoader::load ──────────┐
//!      │                                        ├─► ReadinessGate (derives bbox once)
//!      └─► spawn: world file fetch + parse ────┘
//!
//! GeoRaster::sample(coord)
//!      │
//!      ├─► NotReady / Unavailable  (gate not open)
//!      ├─► OutOfBounds             (outside the derived bbox)
//!      └─► transform to PixelIndex ─► PixelAccess::extract_pixel ─► Pixel
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use georaster::{FileSource, GeoRaster};
//!
//! let raster = GeoRaster::from_world_file(
//!     FileSource::new("elevation.png"),
//!     FileSource::new("elevation.pgw"),
//! )?;
//! raster.wait_ready().await?;
//!
//! let pixel = raster.sample((47.5, 19.0))?;
//! println!("RGBA at Budapest: {:?}", pixel.rgba());
//! ```

pub mod config;
pub mod error;
pub mod geo_raster;
pub mod raster;
pub mod readiness;
pub mod resolver;
pub mod source;

// Re-export commonly used types at crate root
pub use config::{ChannelLayout, SamplerConfig};
pub use error::{Input, LoadError, LoadFailure, OpenError, SampleError};
pub use geo_raster::{GeoRaster, GeoRasterBuilder};
pub use raster::{DecodedRaster, EncodedRaster, Pixel, PixelAccess, RasterLoader};
pub use readiness::{InputStatus, Readiness};
pub use resolver::GeorefSource;
pub use source::{
    source_from_uri, ByteSource, FileSource, HttpSource, MemorySource, ObjectStoreSource,
};

pub use geo_common::{
    BoundingBox, EdgePolicy, GeorefError, Georeference, LatLng, PixelIndex, RasterDimensions,
    ToLatLng,
};
