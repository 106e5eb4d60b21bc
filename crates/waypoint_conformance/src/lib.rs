//! Test fixtures for exercising the route cache end to end.
//!
//! Provides a scratch project directory whose files get explicit, stable
//! modification times, and a loader wrapper that counts rebuilds.

#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use waypoint_loader::{LoadError, LoadListener, RouteLoader, TomlRouteLoader};
use waypoint_routes::RouteCollection;

/// How far in the past fixture files are dated when written.
pub const FIXTURE_AGE: Duration = Duration::from_secs(24 * 3600);

/// A scratch project directory.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Creates an empty project directory.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Directory used for manifests.
    pub fn manifest_dir(&self) -> PathBuf {
        self.root().join("var").join("manifests")
    }

    /// Path used for the persisted cache entry.
    pub fn cache_file(&self) -> PathBuf {
        self.root().join("var").join("routes.bin")
    }

    /// Writes `content` to `name` (relative to the root), dated
    /// [`FIXTURE_AGE`] in the past.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture dir");
        }
        std::fs::write(&path, content).expect("write fixture");
        set_mtime(&path, SystemTime::now() - FIXTURE_AGE);
        path
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets the modification time of `path`.
pub fn set_mtime(path: &Path, time: SystemTime) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .expect("open for set_modified")
        .set_modified(time)
        .expect("set_modified");
}

/// Dates `path` one hour in the future, newer than anything the cache writes
/// during a test.
pub fn touch_future(path: &Path) {
    set_mtime(path, SystemTime::now() + Duration::from_secs(3600));
}

/// Wraps a loader and counts top-level loads.
#[derive(Debug, Default)]
pub struct CountingLoader<L = TomlRouteLoader> {
    inner: L,
    loads: usize,
}

impl<L> CountingLoader<L> {
    /// Wraps `inner`.
    pub fn new(inner: L) -> Self {
        Self { inner, loads: 0 }
    }

    /// Number of resources loaded so far.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

impl CountingLoader<TomlRouteLoader> {
    /// Counts loads performed by a [`TomlRouteLoader`].
    pub fn toml() -> Self {
        Self::new(TomlRouteLoader::new())
    }
}

impl<L: RouteLoader> RouteLoader for CountingLoader<L> {
    fn load(
        &mut self,
        resource: &Path,
        listener: &mut dyn LoadListener,
    ) -> Result<RouteCollection, LoadError> {
        self.loads += 1;
        self.inner.load(resource, listener)
    }
}
