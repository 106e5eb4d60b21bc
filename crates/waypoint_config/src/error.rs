//! Error types for `waypoint.toml` loading and validation.

use std::path::PathBuf;

/// Errors produced while reading, parsing or validating a `waypoint.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {}: {source}", path.display())]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A required table or key is absent or empty, named by its dotted path
    /// (e.g. `cache.resources`).
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A key is present but its value cannot be used.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending key.
        field: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}
