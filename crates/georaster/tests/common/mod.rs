//! Common helpers for georaster integration tests.
//!
//! Provides byte sources whose fetch completes only when the test says so,
//! which makes the arrival order of the two inputs deterministic.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use georaster::{ByteSource, GeoRaster, InputStatus, LoadError, MemorySource, Readiness};
use test_utils::RasterSpec;
use tokio::sync::{oneshot, watch};

/// A byte source that blocks until its [`Gate`] is released.
pub struct GatedSource {
    id: String,
    rx: Mutex<Option<oneshot::Receiver<Bytes>>>,
}

/// Test-side handle of a [`GatedSource`].
///
/// Dropping the gate without releasing it makes the fetch fail.
pub struct Gate(oneshot::Sender<Bytes>);

impl Gate {
    pub fn release(self, data: impl Into<Bytes>) {
        let _ = self.0.send(data.into());
    }
}

pub fn gated(id: &str) -> (GatedSource, Gate) {
    let (tx, rx) = oneshot::channel();
    let source = GatedSource {
        id: id.to_string(),
        rx: Mutex::new(Some(rx)),
    };
    (source, Gate(tx))
}

#[async_trait]
impl ByteSource for GatedSource {
    async fn fetch(&self) -> Result<Bytes, LoadError> {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| LoadError::fetch(&self.id, "already fetched"))?;

        rx.await
            .map_err(|_| LoadError::fetch(&self.id, "gate closed without data"))
    }

    fn identifier(&self) -> &str {
        &self.id
    }
}

/// Open a raster with inline georeference from a fixture, fully loaded.
pub async fn open_ready(spec: RasterSpec) -> GeoRaster {
    let raster = GeoRaster::from_origin(
        MemorySource::new(spec.png()),
        spec.origin_lng,
        spec.origin_lat,
        spec.pixel_size,
    )
    .expect("Failed to open raster");

    raster.wait_ready().await.expect("Raster failed to load");
    raster
}

/// Wait for the next readiness change and return it.
pub async fn next_change(rx: &mut watch::Receiver<Readiness>) -> Readiness {
    rx.changed().await.expect("Readiness sender dropped");
    let readiness = rx.borrow_and_update().clone();
    readiness
}

/// Wait until `input_status` reports something other than pending.
pub async fn wait_settled(
    rx: &mut watch::Receiver<Readiness>,
    input_status: impl Fn(&Readiness) -> InputStatus,
) -> Readiness {
    loop {
        let current = rx.borrow_and_update().clone();
        if input_status(&current) != InputStatus::Pending {
            return current;
        }
        rx.changed().await.expect("Readiness sender dropped");
    }
}
