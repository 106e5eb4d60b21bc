//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{CacheConfig, WaypointConfig};
use std::path::Path;

/// Name of the configuration file within a project directory.
pub const CONFIG_FILE: &str = "waypoint.toml";

/// Loads and validates the cache configuration from a project directory.
///
/// Reads `<project_dir>/waypoint.toml`, parses it, validates it, and resolves
/// relative paths against `project_dir`.
pub fn load_config(project_dir: &Path) -> Result<CacheConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Read {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(load_config_from_str(&content)?.resolve(project_dir))
}

/// Parses and validates a `waypoint.toml` configuration from a string.
///
/// Paths are returned exactly as written.
pub fn load_config_from_str(content: &str) -> Result<CacheConfig, ConfigError> {
    let config: WaypointConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    let cache = config.cache.ok_or(ConfigError::MissingField("cache"))?;
    validate_config(&cache)?;
    Ok(cache)
}

/// Validates that required fields are present and values are usable.
fn validate_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.resources.is_empty() {
        return Err(ConfigError::MissingField("cache.resources"));
    }
    if let Some(index) = config.resources.iter().position(|r| r.as_os_str().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: "cache.resources",
            reason: format!("entry {} is an empty path", index + 1),
        });
    }
    if config.manifest_dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("cache.manifest_dir"));
    }
    if config.cache_file.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("cache.cache_file"));
    }
    Ok(())
}
