//! Parsing and validation of `waypoint.toml` route cache configuration.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`CacheConfig`] naming the route resources, where manifests and the
//! compiled cache entry live, and whether debug-mode tracking is enabled.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
