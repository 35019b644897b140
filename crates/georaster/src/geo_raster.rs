//! The query facade: a georeferenced raster answering point queries.
//!
//! # Example
//!
//! ```rust,ignore
//! use georaster::{GeoRaster, GeorefSource, HttpSource, SamplerConfig};
//!
//! let raster = GeoRaster::builder(HttpSource::new("https://example.com/landcover.png"))
//!     .georeference(GeorefSource::world_file(HttpSource::new(
//!         "https://example.com/landcover.pgw",
//!     )))
//!     .config(SamplerConfig::default().with_load_timeout(Duration::from_secs(10)))
//!     .open()?;
//!
//! match raster.sample(LatLng::new(48.2, 16.4)) {
//!     Ok(pixel) => println!("{:?}", pixel.rgba()),
//!     Err(SampleError::NotReady) => { /* try again later */ }
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use geo_common::{BoundingBox, Georeference, LatLng, PixelIndex, RasterDimensions, ToLatLng};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::SamplerConfig;
use crate::error::{Input, LoadError, LoadFailure, OpenError, SampleError};
use crate::raster::{EncodedRaster, Pixel, RasterLoader};
use crate::readiness::{Readiness, ReadinessGate, ReadyView};
use crate::resolver::{fetch_world_file, GeorefSource};
use crate::source::ByteSource;

/// A raster placed in geographic space, sampled by coordinate.
///
/// Cloning is cheap; clones share the same loads and state.
#[derive(Clone)]
pub struct GeoRaster {
    inner: Arc<Inner>,
}

struct Inner {
    gate: ReadinessGate,
    config: SamplerConfig,
}

/// Builder for [`GeoRaster`].
pub struct GeoRasterBuilder {
    raster: RasterInput,
    georef: Option<GeorefSource>,
    config: SamplerConfig,
}

enum RasterInput {
    Source(Arc<dyn ByteSource>),
    Loader(Arc<dyn RasterLoader>),
}

impl GeoRasterBuilder {
    /// Set where the georeference comes from. Required.
    pub fn georeference(mut self, georef: impl Into<GeorefSource>) -> Self {
        self.georef = Some(georef.into());
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: SamplerConfig) -> Self {
        self.config = config;
        self
    }

    /// Start both loads and return immediately.
    ///
    /// Must be called from within a Tokio runtime. An inline georeference is
    /// ready before this returns; everything else completes in the
    /// background.
    pub fn open(self) -> Result<GeoRaster, OpenError> {
        self.config.validate().map_err(OpenError::Config)?;
        let georef = self.georef.ok_or(OpenError::MissingGeoreference)?;
        let runtime = Handle::try_current().map_err(|_| OpenError::NoRuntime)?;

        let loader: Arc<dyn RasterLoader> = match self.raster {
            RasterInput::Source(source) => {
                Arc::new(EncodedRaster::new(source, self.config.channel_layout))
            }
            RasterInput::Loader(loader) => loader,
        };

        let inner = Arc::new(Inner {
            gate: ReadinessGate::new(),
            config: self.config,
        });
        let timeout = inner.config.load_timeout;

        match georef {
            GeorefSource::Inline(georef) => inner.gate.resolve_georeference(Ok(georef)),
            GeorefSource::WorldFile(source) => {
                let inner = Arc::clone(&inner);
                spawn_load(
                    &runtime,
                    async move {
                        bounded(Input::Georeference, timeout, fetch_world_file(source.as_ref()))
                            .await
                    },
                    move |outcome| inner.gate.resolve_georeference(outcome),
                );
            }
        }

        {
            let inner = Arc::clone(&inner);
            spawn_load(
                &runtime,
                async move { bounded(Input::Raster, timeout, loader.load()).await },
                move |outcome| inner.gate.resolve_raster(outcome),
            );
        }

        Ok(GeoRaster { inner })
    }
}

impl GeoRaster {
    /// Start building a raster decoded from the bytes of `source`.
    pub fn builder(source: impl ByteSource + 'static) -> GeoRasterBuilder {
        Self::builder_with(RasterInput::Source(Arc::new(source)))
    }

    /// Start building a raster obtained from a custom loader.
    pub fn builder_with_loader(loader: impl RasterLoader + 'static) -> GeoRasterBuilder {
        Self::builder_with(RasterInput::Loader(Arc::new(loader)))
    }

    fn builder_with(raster: RasterInput) -> GeoRasterBuilder {
        GeoRasterBuilder {
            raster,
            georef: None,
            config: SamplerConfig::default(),
        }
    }

    /// Open a raster whose top-left corner and pixel size are known.
    pub fn from_origin(
        source: impl ByteSource + 'static,
        origin_lng: f64,
        origin_lat: f64,
        pixel_size_deg: f64,
    ) -> Result<Self, OpenError> {
        let georef = Georeference::new(origin_lng, origin_lat, pixel_size_deg)?;
        Self::builder(source).georeference(georef).open()
    }

    /// Open a raster georeferenced by a world file.
    pub fn from_world_file(
        source: impl ByteSource + 'static,
        world_file: impl ByteSource + 'static,
    ) -> Result<Self, OpenError> {
        Self::builder(source)
            .georeference(GeorefSource::world_file(world_file))
            .open()
    }

    /// Sample the raster at a coordinate.
    ///
    /// Accepts a [`LatLng`], a `(lat, lng)` tuple, a `[lat, lng]` array or any
    /// other [`ToLatLng`] type.
    pub fn sample(&self, coord: impl ToLatLng) -> Result<Pixel, SampleError> {
        let (view, index) = self.locate(coord.to_lat_lng())?;
        Ok(view.pixels.extract_pixel(index.row, index.col))
    }

    /// Sample the raster at `lat`, `lng`.
    pub fn sample_lat_lng(&self, lat: f64, lng: f64) -> Result<Pixel, SampleError> {
        self.sample(LatLng::new(lat, lng))
    }

    /// The pixel a coordinate falls in, with the same checks as [`Self::sample`].
    pub fn pixel_index(&self, coord: impl ToLatLng) -> Result<PixelIndex, SampleError> {
        self.locate(coord.to_lat_lng()).map(|(_, index)| index)
    }

    fn locate(&self, coord: LatLng) -> Result<(ReadyView, PixelIndex), SampleError> {
        let Some(view) = self.inner.gate.ready_view() else {
            let readiness = self.inner.gate.snapshot();
            if let Some(failure) = readiness.failure() {
                return Err(SampleError::Unavailable(failure.clone()));
            }
            warn!(
                lat = coord.lat,
                lng = coord.lng,
                "Raster not loaded yet, query rejected"
            );
            return Err(SampleError::NotReady);
        };

        if !view.bbox.admits(coord, self.inner.config.edge_policy) {
            debug!(lat = coord.lat, lng = coord.lng, bbox = %view.bbox, "Location out of bounds");
            return Err(SampleError::OutOfBounds {
                lat: coord.lat,
                lng: coord.lng,
                bbox: view.bbox,
            });
        }

        let index = view.georef.pixel_index(coord, view.dims);
        Ok((view, index))
    }

    /// Current load state of both inputs.
    pub fn readiness(&self) -> Readiness {
        self.inner.gate.snapshot()
    }

    /// Whether queries will be answered.
    pub fn is_ready(&self) -> bool {
        self.inner.gate.ready_view().is_some()
    }

    /// Receiver notified whenever an input finishes loading or fails.
    pub fn subscribe(&self) -> watch::Receiver<Readiness> {
        self.inner.gate.subscribe()
    }

    /// Wait until both inputs are loaded, or one of them fails.
    pub async fn wait_ready(&self) -> Result<(), LoadFailure> {
        let mut rx = self.inner.gate.subscribe();
        loop {
            {
                let readiness = rx.borrow_and_update();
                if readiness.is_ready() {
                    return Ok(());
                }
                if let Some(failure) = readiness.failure() {
                    return Err(failure.clone());
                }
            }

            if rx.changed().await.is_err() {
                // The sender lives in `inner`, which `self` keeps alive.
                return std::future::pending().await;
            }
        }
    }

    /// Geographic footprint, once both inputs are loaded.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.inner.gate.ready_view().map(|view| view.bbox)
    }

    /// The georeference, once both inputs are loaded.
    pub fn georeference(&self) -> Option<Georeference> {
        self.inner.gate.ready_view().map(|view| view.georef)
    }

    /// Raster size, once both inputs are loaded.
    pub fn dimensions(&self) -> Option<RasterDimensions> {
        self.inner.gate.ready_view().map(|view| view.dims)
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.inner.config
    }
}

/// Run one load on the runtime and hand its outcome to `settle`.
///
/// A load that panics or is cancelled still settles, as `TaskFailed`.
fn spawn_load<T, F>(
    runtime: &Handle,
    load: F,
    settle: impl FnOnce(Result<T, LoadError>) + Send + 'static,
) where
    T: Send + 'static,
    F: Future<Output = Result<T, LoadError>> + Send + 'static,
{
    let task = runtime.spawn(load);
    runtime.spawn(async move {
        let outcome = task
            .await
            .unwrap_or_else(|e| Err(LoadError::TaskFailed(e.to_string())));
        settle(outcome);
    });
}

/// Apply the optional load timeout to one input.
async fn bounded<T>(
    input: Input,
    limit: Option<Duration>,
    load: impl Future<Output = Result<T, LoadError>>,
) -> Result<T, LoadError> {
    match limit {
        Some(after) => tokio::time::timeout(after, load)
            .await
            .unwrap_or(Err(LoadError::Timeout { input, after })),
        None => load.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use test_utils::{create_test_png, fixtures::TWO_BY_TWO, pixel_pattern};

    #[tokio::test]
    async fn test_inline_georeference_is_ready_immediately() {
        let raster = GeoRaster::from_origin(
            MemorySource::new(TWO_BY_TWO.png()),
            TWO_BY_TWO.origin_lng,
            TWO_BY_TWO.origin_lat,
            TWO_BY_TWO.pixel_size,
        )
        .unwrap();

        assert_eq!(
            raster.readiness().georeference,
            crate::readiness::InputStatus::Ready
        );
        raster.wait_ready().await.unwrap();
        assert!(raster.is_ready());
        assert_eq!(raster.sample((49.5, 10.5)).unwrap().rgba(), pixel_pattern(0, 0));
    }

    #[tokio::test]
    async fn test_open_requires_georeference() {
        let result = GeoRaster::builder(MemorySource::new(create_test_png(1, 1))).open();
        assert!(matches!(result, Err(OpenError::MissingGeoreference)));
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_config() {
        let result = GeoRaster::builder(MemorySource::new(create_test_png(1, 1)))
            .georeference(Georeference::new(0.0, 0.0, 1.0).unwrap())
            .config(SamplerConfig::default().with_load_timeout(Duration::ZERO))
            .open();
        assert!(matches!(result, Err(OpenError::Config(_))));
    }

    #[tokio::test]
    async fn test_from_origin_rejects_bad_pixel_size() {
        let result = GeoRaster::from_origin(MemorySource::new(create_test_png(1, 1)), 0.0, 0.0, -1.0);
        assert!(matches!(result, Err(OpenError::Georeference(_))));
    }

    #[test]
    fn test_open_outside_runtime() {
        let result = GeoRaster::from_origin(MemorySource::new(create_test_png(1, 1)), 0.0, 0.0, 1.0);
        assert!(matches!(result, Err(OpenError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_spawn_load_reports_panic() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        spawn_load(
            &Handle::current(),
            async {
                if true {
                    panic!("decoder exploded");
                }
                Ok(())
            },
            move |outcome: Result<(), LoadError>| {
                let _ = tx.send(outcome);
            },
        );

        let outcome = rx.await.unwrap();
        assert!(matches!(outcome, Err(LoadError::TaskFailed(message)) if message.contains("panic")));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let outcome: Result<(), LoadError> = bounded(
            Input::Raster,
            Some(Duration::from_millis(10)),
            std::future::pending(),
        )
        .await;

        assert_eq!(
            outcome,
            Err(LoadError::Timeout {
                input: Input::Raster,
                after: Duration::from_millis(10)
            })
        );
    }

    #[tokio::test]
    async fn test_bounded_without_limit_passes_through() {
        let outcome = bounded(Input::Georeference, None, async { Ok::<_, LoadError>(7) }).await;
        assert_eq!(outcome, Ok(7));
    }
}
