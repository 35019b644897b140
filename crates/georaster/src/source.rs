//! Byte sources: where raster and world file bytes come from.
//!
//! Every input is fetched exactly once, so a source only needs to hand
//! over its whole content.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{path::Path as ObjectPath, ObjectStore};
use tracing::{debug, instrument};

use crate::error::LoadError;

/// Trait for fetching the full content of a raster or world file.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Fetch all bytes of the source.
    async fn fetch(&self) -> Result<Bytes, LoadError>;

    /// Human-readable identifier for this source (for logging/errors).
    fn identifier(&self) -> &str;
}

#[async_trait]
impl<T: ByteSource + ?Sized> ByteSource for Arc<T> {
    async fn fetch(&self) -> Result<Bytes, LoadError> {
        (**self).fetch().await
    }

    fn identifier(&self) -> &str {
        (**self).identifier()
    }
}

/// Create a source from a URI: `http://` and `https://` go over HTTP,
/// anything else is a local path.
pub fn source_from_uri(uri: &str) -> Arc<dyn ByteSource> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        Arc::new(HttpSource::new(uri))
    } else {
        Arc::new(FileSource::new(uri))
    }
}

/// A file on the local filesystem.
pub struct FileSource {
    path: PathBuf,
    id: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let id = path.display().to_string();
        Self { path, id }
    }
}

#[async_trait]
impl ByteSource for FileSource {
    #[instrument(skip(self), fields(path = %self.id))]
    async fn fetch(&self) -> Result<Bytes, LoadError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| LoadError::fetch(&self.id, e))?;

        debug!(size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    fn identifier(&self) -> &str {
        &self.id
    }
}

/// A document served over HTTP(S).
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Use a preconfigured client (proxies, headers, timeouts).
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl ByteSource for HttpSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Bytes, LoadError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| LoadError::fetch(&self.url, e))?;

        let data = response
            .bytes()
            .await
            .map_err(|e| LoadError::fetch(&self.url, e))?;

        debug!(size = data.len(), "Downloaded");
        Ok(data)
    }

    fn identifier(&self) -> &str {
        &self.url
    }
}

/// An object in any `object_store` backend (S3, MinIO, GCS, in-memory).
pub struct ObjectStoreSource {
    store: Arc<dyn ObjectStore>,
    location: ObjectPath,
    id: String,
}

impl ObjectStoreSource {
    pub fn new(store: Arc<dyn ObjectStore>, location: &str) -> Self {
        let location = ObjectPath::from(location);
        let id = format!("{}/{}", store, location);
        Self {
            store,
            location,
            id,
        }
    }
}

#[async_trait]
impl ByteSource for ObjectStoreSource {
    #[instrument(skip(self), fields(location = %self.location))]
    async fn fetch(&self) -> Result<Bytes, LoadError> {
        let result = self
            .store
            .get(&self.location)
            .await
            .map_err(|e| LoadError::fetch(&self.id, e))?;

        let data = result
            .bytes()
            .await
            .map_err(|e| LoadError::fetch(&self.id, e))?;

        debug!(size = data.len(), "Read object");
        Ok(data)
    }

    fn identifier(&self) -> &str {
        &self.id
    }
}

/// Bytes already in memory.
pub struct MemorySource {
    data: Bytes,
    id: String,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::named("memory", data)
    }

    /// In-memory bytes with a name for logs and errors.
    pub fn named(id: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            id: id.into(),
        }
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    async fn fetch(&self) -> Result<Bytes, LoadError> {
        Ok(self.data.clone())
    }

    fn identifier(&self) -> &str {
        &self.id
    }
}
