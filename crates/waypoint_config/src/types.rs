//! Configuration types deserialized from `waypoint.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default directory for per-resource manifests, relative to the project.
pub const DEFAULT_MANIFEST_DIR: &str = "var/cache/routing/manifests";

/// Default location of the compiled route cache entry, relative to the project.
pub const DEFAULT_CACHE_FILE: &str = "var/cache/routing/routes.bin";

/// The top-level configuration parsed from `waypoint.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct WaypointConfig {
    /// Route cache settings. Absent when the file has no `[cache]` table.
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

/// Settings for the compiled route cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Top-level route resource files, loaded and merged in this order.
    pub resources: Vec<PathBuf>,
    /// Root directory for per-resource dependency manifests.
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,
    /// Path of the persisted compiled route collection.
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    /// Track transitively loaded files and validate them before trusting the
    /// cache. When off, only top-level resource timestamps are checked.
    #[serde(default)]
    pub debug: bool,
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from(DEFAULT_MANIFEST_DIR)
}

fn default_cache_file() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_FILE)
}

impl CacheConfig {
    /// Creates a configuration for `resources` with default locations and
    /// debug tracking disabled.
    pub fn new(resources: Vec<PathBuf>) -> Self {
        Self {
            resources,
            manifest_dir: default_manifest_dir(),
            cache_file: default_cache_file(),
            debug: false,
        }
    }

    /// Returns a copy with every relative path joined onto `base_dir`.
    /// Absolute paths are kept as they are.
    pub fn resolve(&self, base_dir: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base_dir.join(p)
            }
        };
        Self {
            resources: self.resources.iter().map(join).collect(),
            manifest_dir: join(&self.manifest_dir),
            cache_file: join(&self.cache_file),
            debug: self.debug,
        }
    }
}
