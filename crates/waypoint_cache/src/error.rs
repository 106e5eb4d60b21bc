//! Error types for route cache operations.

use std::path::PathBuf;

use waypoint_loader::LoadError;

/// Errors that can occur during route cache operations.
///
/// Validity checks never fail: a missing, stale, or unreadable artifact just
/// makes the cache invalid and triggers a rebuild. These errors surface from
/// the rebuild and write path, and from reading the final entry.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A cache directory could not be created.
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Permissions could not be applied to an existing cache directory.
    #[error("cannot apply permissions on cache directory {path}: {source}")]
    Permissions {
        /// The directory whose permissions could not be changed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A persisted manifest or cache entry is unreadable or was produced by an
    /// incompatible version.
    #[error("corrupt cache file {path}: {reason}")]
    Corrupt {
        /// The offending file.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// The storage backend holds no route collection.
    #[error("no cached route collection has been written")]
    Empty,

    /// A serialization error occurred while encoding a cache file.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A route resource failed to load during a rebuild.
    #[error("failed to load route resources: {0}")]
    Load(#[from] LoadError),
}

impl CacheError {
    /// Returns `true` for errors that mean the persisted data cannot be
    /// trusted, as opposed to failures of the environment.
    pub fn is_corruption(&self) -> bool {
        matches!(self, CacheError::Corrupt { .. })
    }
}
