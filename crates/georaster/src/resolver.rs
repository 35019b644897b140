//! Georeference resolution: inline values or a fetched world file.

use std::fmt;
use std::sync::Arc;

use geo_common::Georeference;
use tracing::{debug, instrument};

use crate::error::LoadError;
use crate::source::ByteSource;

/// Where a raster's georeference comes from.
#[derive(Clone)]
pub enum GeorefSource {
    /// Known up front; the georeference is ready immediately.
    Inline(Georeference),
    /// A world file fetched and parsed asynchronously.
    WorldFile(Arc<dyn ByteSource>),
}

impl GeorefSource {
    /// Georeference from the top-left corner and pixel size.
    pub fn inline(georef: Georeference) -> Self {
        Self::Inline(georef)
    }

    /// Georeference read from a world file.
    pub fn world_file(source: impl ByteSource + 'static) -> Self {
        Self::WorldFile(Arc::new(source))
    }
}

impl fmt::Debug for GeorefSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(georef) => f.debug_tuple("Inline").field(georef).finish(),
            Self::WorldFile(source) => f.debug_tuple("WorldFile").field(&source.identifier()).finish(),
        }
    }
}

impl From<Georeference> for GeorefSource {
    fn from(georef: Georeference) -> Self {
        Self::Inline(georef)
    }
}

/// Fetch a world file and parse it.
///
/// Non-UTF-8 bytes are replaced before parsing, so binary garbage surfaces
/// as a malformed token rather than a separate error.
#[instrument(skip(source), fields(source = %source.identifier()))]
pub async fn fetch_world_file(source: &dyn ByteSource) -> Result<Georeference, LoadError> {
    let bytes = source.fetch().await?;
    let text = String::from_utf8_lossy(&bytes);
    debug!(size = bytes.len(), "Parsing world file");

    Ok(Georeference::from_world_file(&text)?)
}
