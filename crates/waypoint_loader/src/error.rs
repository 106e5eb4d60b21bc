//! Error types for route resource loading.

use std::path::PathBuf;

/// Errors that can occur while loading a route resource.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The resource file could not be read.
    #[error("failed to read route resource {path}: {source}")]
    Io {
        /// The resource path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The resource content is not valid for this loader.
    #[error("failed to parse route resource {path}: {reason}")]
    Parse {
        /// The resource path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A resource imports itself, directly or through other resources.
    #[error("import cycle detected at {path}")]
    ImportCycle {
        /// The resource that was imported a second time.
        path: PathBuf,
    },

    /// A route definition is structurally invalid.
    #[error("invalid route '{name}': {reason}")]
    InvalidRoute {
        /// The route name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}
