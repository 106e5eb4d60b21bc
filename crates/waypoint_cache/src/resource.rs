//! File dependencies and freshness checks.
//!
//! A [`FileResourceCollector`] is an ordered, de-duplicated set of file paths.
//! It serves two roles: the configured set of top-level route resources, and
//! the per-resource list of files touched while loading that resource.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use waypoint_common::is_newer_than;

/// A file the cache depends on. Equality is by path.
///
/// Modification times are not stored; freshness is read from the filesystem
/// each time it is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    /// Creates a resource for `path`. Does not touch the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The tracked path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the file exists and has not been modified after
    /// `since`.
    pub fn is_fresh(&self, since: SystemTime) -> bool {
        !is_newer_than(&self.path, since)
    }
}

/// Ordered set of file dependencies.
///
/// Insertion order is discovery order; adding a path that is already present
/// is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileResourceCollector {
    resources: Vec<FileResource>,
}

impl FileResourceCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` as a dependency. Returns `false` if it was already
    /// registered.
    pub fn add_file_resource(&mut self, path: impl Into<PathBuf>) -> bool {
        let resource = FileResource::new(path);
        if self.resources.contains(&resource) {
            return false;
        }
        self.resources.push(resource);
        true
    }

    /// Iterates over registered paths in insertion order.
    ///
    /// The iterator can be cloned to restart enumeration from the same point.
    pub fn resources(&self) -> impl Iterator<Item = &Path> + Clone + '_ {
        self.resources.iter().map(FileResource::path)
    }

    /// Returns `true` if `path` is registered.
    pub fn contains(&self, path: &Path) -> bool {
        self.resources.iter().any(|r| r.path() == path)
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if no paths are registered.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Returns `true` if every registered file still exists and none was
    /// modified after `since`. An empty collector is always valid.
    pub fn is_valid(&self, since: SystemTime) -> bool {
        self.resources.iter().all(|r| r.is_fresh(since))
    }
}

impl From<PathBuf> for FileResourceCollector {
    fn from(path: PathBuf) -> Self {
        std::iter::once(path).collect()
    }
}

impl From<&Path> for FileResourceCollector {
    fn from(path: &Path) -> Self {
        Self::from(path.to_path_buf())
    }
}

impl From<Vec<PathBuf>> for FileResourceCollector {
    fn from(paths: Vec<PathBuf>) -> Self {
        paths.into_iter().collect()
    }
}

impl From<&[PathBuf]> for FileResourceCollector {
    fn from(paths: &[PathBuf]) -> Self {
        paths.iter().cloned().collect()
    }
}

impl FromIterator<PathBuf> for FileResourceCollector {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        let mut collector = Self::new();
        for path in iter {
            collector.add_file_resource(path);
        }
        collector
    }
}
