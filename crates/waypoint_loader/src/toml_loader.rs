//! Loader for TOML route files with nested imports.
//!
//! A route file declares routes under `[routes.<name>]` and may pull in other
//! files with `[[imports]]`:
//!
//! ```toml
//! [[imports]]
//! resource = "admin.toml"
//! prefix = "/admin"
//!
//! [routes.home]
//! path = "/"
//! methods = ["GET"]
//! ```
//!
//! Import paths are resolved relative to the importing file. Imported routes
//! are merged first, so a file's own definitions override imported ones.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;
use waypoint_routes::{Route, RouteCollection};

use crate::error::LoadError;
use crate::listener::LoadListener;
use crate::loader::RouteLoader;

/// On-disk shape of a route file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteFile {
    #[serde(default)]
    imports: Vec<ImportSpec>,
    #[serde(default)]
    routes: IndexMap<String, Route>,
}

/// A single `[[imports]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImportSpec {
    resource: String,
    #[serde(default)]
    prefix: Option<String>,
}

/// Loads TOML route files, following `[[imports]]` recursively.
#[derive(Debug, Default)]
pub struct TomlRouteLoader {
    /// Files currently being loaded, outermost first. Used to detect cycles.
    stack: Vec<PathBuf>,
}

impl TomlRouteLoader {
    /// Creates a new loader.
    pub fn new() -> Self {
        Self::default()
    }

    fn load_file(
        &mut self,
        path: &Path,
        listener: &mut dyn LoadListener,
    ) -> Result<RouteCollection, LoadError> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.stack.contains(&key) {
            return Err(LoadError::ImportCycle {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        listener.on_file_loaded(path);
        debug!("Loaded route file {}", path.display());

        let file: RouteFile = toml::from_str(&content).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        self.stack.push(key);
        let result = self.build(path, file, listener);
        self.stack.pop();
        result
    }

    fn build(
        &mut self,
        path: &Path,
        file: RouteFile,
        listener: &mut dyn LoadListener,
    ) -> Result<RouteCollection, LoadError> {
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let mut collection = RouteCollection::new();

        for import in file.imports {
            let mut imported = self.load_file(&base.join(&import.resource), listener)?;
            if let Some(prefix) = import.prefix.as_deref() {
                imported.add_prefix(prefix);
            }
            collection.merge(imported);
        }

        for (name, mut route) in file.routes {
            validate_route(&name, &route)?;
            route.normalize_methods();
            collection.add(name, route);
        }

        Ok(collection)
    }
}

impl RouteLoader for TomlRouteLoader {
    fn load(
        &mut self,
        resource: &Path,
        listener: &mut dyn LoadListener,
    ) -> Result<RouteCollection, LoadError> {
        self.stack.clear();
        self.load_file(resource, listener)
    }
}

fn validate_route(name: &str, route: &Route) -> Result<(), LoadError> {
    if name.is_empty() {
        return Err(LoadError::InvalidRoute {
            name: name.to_string(),
            reason: "route name must not be empty".to_string(),
        });
    }
    if !route.path.starts_with('/') {
        return Err(LoadError::InvalidRoute {
            name: name.to_string(),
            reason: format!("path '{}' must start with '/'", route.path),
        });
    }
    Ok(())
}
