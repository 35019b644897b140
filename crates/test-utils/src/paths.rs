//! Temporary on-disk fixtures.

use std::path::PathBuf;

use tempfile::TempDir;

/// A temporary directory holding fixture files.
///
/// The directory and its contents are removed when this value is dropped.
pub struct TempFixtures {
    dir: TempDir,
}

impl TempFixtures {
    /// Creates an empty fixture directory.
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("georaster_test_")
            .tempdir()
            .expect("Failed to create temporary test directory");
        Self { dir }
    }

    /// Writes `contents` to `name` inside the directory and returns its path.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Path of a file inside the directory, whether or not it exists.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for TempFixtures {
    fn default() -> Self {
        Self::new()
    }
}
