//! Raster decoding and pixel extraction.

use std::sync::Arc;

use async_trait::async_trait;
use geo_common::RasterDimensions;
use tracing::{debug, instrument};

use crate::config::ChannelLayout;
use crate::error::LoadError;
use crate::source::ByteSource;

/// The channel values of one pixel, in channel order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pixel(Vec<u8>);

impl Pixel {
    pub fn new(channels: Vec<u8>) -> Self {
        Self(channels)
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// The pixel expanded to RGBA.
    ///
    /// Gray is replicated into red, green and blue; a missing alpha channel
    /// is opaque.
    pub fn rgba(&self) -> [u8; 4] {
        match self.0.as_slice() {
            [gray] => [*gray, *gray, *gray, u8::MAX],
            [gray, alpha] => [*gray, *gray, *gray, *alpha],
            [r, g, b] => [*r, *g, *b, u8::MAX],
            [r, g, b, a, ..] => [*r, *g, *b, *a],
            [] => [0, 0, 0, 0],
        }
    }
}

impl AsRef<[u8]> for Pixel {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Read access to a loaded raster.
pub trait PixelAccess: Send + Sync {
    fn dimensions(&self) -> RasterDimensions;

    /// Number of channels in every extracted pixel.
    fn channel_count(&self) -> usize;

    /// Channel values of the pixel at `(row, col)`.
    ///
    /// The caller guarantees `row < height` and `col < width`.
    fn extract_pixel(&self, row: u32, col: u32) -> Pixel;
}

/// Trait for obtaining a raster, asynchronously and exactly once.
#[async_trait]
pub trait RasterLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn PixelAccess>, LoadError>;
}

/// A fully decoded raster held as packed 8-bit channels, row-major.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    dims: RasterDimensions,
    channels: usize,
    data: Vec<u8>,
}

impl DecodedRaster {
    /// Wrap already decoded pixel data.
    pub fn from_raw(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self, LoadError> {
        let dims =
            RasterDimensions::new(width, height).ok_or(LoadError::EmptyRaster { width, height })?;

        if channels == 0 || data.len() != dims.pixel_count() * channels {
            return Err(LoadError::Decode(format!(
                "expected {} bytes for {}x{} pixels with {} channels, got {}",
                dims.pixel_count() * channels,
                width,
                height,
                channels,
                data.len()
            )));
        }

        Ok(Self {
            dims,
            channels,
            data,
        })
    }

    /// Decode an encoded image (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8], layout: ChannelLayout) -> Result<Self, LoadError> {
        let image = image::load_from_memory(bytes)?;

        let (channels, width, height, data) = match (layout, image.color().channel_count()) {
            (ChannelLayout::Native, 1) => {
                let buf = image.to_luma8();
                (1, buf.width(), buf.height(), buf.into_raw())
            }
            (ChannelLayout::Native, 2) => {
                let buf = image.to_luma_alpha8();
                (2, buf.width(), buf.height(), buf.into_raw())
            }
            (ChannelLayout::Native, 3) => {
                let buf = image.to_rgb8();
                (3, buf.width(), buf.height(), buf.into_raw())
            }
            _ => {
                let buf = image.to_rgba8();
                (4, buf.width(), buf.height(), buf.into_raw())
            }
        };

        Self::from_raw(width, height, channels, data)
    }
}

impl PixelAccess for DecodedRaster {
    fn dimensions(&self) -> RasterDimensions {
        self.dims
    }

    fn channel_count(&self) -> usize {
        self.channels
    }

    fn extract_pixel(&self, row: u32, col: u32) -> Pixel {
        debug_assert!(row < self.dims.height() && col < self.dims.width());

        let start = (row as usize * self.dims.width() as usize + col as usize) * self.channels;
        Pixel::new(self.data[start..start + self.channels].to_vec())
    }
}

/// Encoded image bytes from a [`ByteSource`], decoded on load.
pub struct EncodedRaster {
    source: Arc<dyn ByteSource>,
    layout: ChannelLayout,
}

impl EncodedRaster {
    pub fn new(source: Arc<dyn ByteSource>, layout: ChannelLayout) -> Self {
        Self { source, layout }
    }
}

#[async_trait]
impl RasterLoader for EncodedRaster {
    #[instrument(skip(self), fields(source = %self.source.identifier(), layout = %self.layout))]
    async fn load(&self) -> Result<Arc<dyn PixelAccess>, LoadError> {
        let bytes = self.source.fetch().await?;
        debug!(size = bytes.len(), "Decoding raster");

        let layout = self.layout;
        let raster = tokio::task::spawn_blocking(move || DecodedRaster::decode(&bytes, layout))
            .await
            .map_err(|e| LoadError::Decode(format!("decode task failed: {}", e)))??;

        Ok(Arc::new(raster))
    }
}
