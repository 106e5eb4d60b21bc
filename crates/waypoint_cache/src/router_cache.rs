//! The route cache orchestrator.
//!
//! [`RouterCache::load`] returns the persisted route collection when it is
//! still valid and rebuilds it through the [`RouteLoader`] otherwise. Validity
//! is recomputed on every call:
//!
//! 1. the storage must hold an entry;
//! 2. no top-level resource may be newer than that entry;
//! 3. in debug mode, every top-level resource must have a manifest, and no
//!    file listed in it may be newer than the manifest itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use waypoint_common::modified_time;
use waypoint_config::CacheConfig;
use waypoint_loader::{LoadListener, RouteLoader};
use waypoint_routes::RouteCollection;

use crate::error::CacheError;
use crate::file_storage::FileStorage;
use crate::manifest::ManifestStore;
use crate::resource::FileResourceCollector;
use crate::storage::RouteStorage;

/// Records the files opened while loading each top-level resource.
///
/// Lent to the loader during a rebuild. Notifications are attributed to the
/// resource currently being loaded.
#[derive(Debug, Default)]
struct DependencyTracker {
    enabled: bool,
    current: Option<PathBuf>,
    collected: HashMap<PathBuf, FileResourceCollector>,
}

impl LoadListener for DependencyTracker {
    fn on_file_loaded(&mut self, path: &Path) {
        if !self.enabled {
            return;
        }
        let Some(current) = self.current.as_ref() else {
            return;
        };
        if current == path {
            return;
        }
        if self
            .collected
            .entry(current.clone())
            .or_default()
            .add_file_resource(path)
        {
            debug!("{} depends on {}", current.display(), path.display());
        }
    }
}

/// Caches the route collection built from a fixed set of resource files.
pub struct RouterCache<S, L> {
    /// Top-level route resources, loaded in this order.
    resources: FileResourceCollector,

    /// Manifest location and persistence.
    manifests: ManifestStore,

    /// Where the compiled collection is persisted.
    storage: S,

    /// Parses resources into route collections.
    loader: L,

    /// Whether transitive dependencies are tracked and validated.
    debug: bool,

    /// Per-resource dependencies gathered during the current rebuild.
    tracker: DependencyTracker,
}

impl<S: RouteStorage, L: RouteLoader> RouterCache<S, L> {
    /// Creates a cache for `resources`.
    ///
    /// `resources` can be a single path, a list of paths, or a prepared
    /// [`FileResourceCollector`]. Manifests are kept under `manifest_root`
    /// and only used when `debug` is on.
    pub fn new(
        resources: impl Into<FileResourceCollector>,
        manifest_root: impl Into<PathBuf>,
        storage: S,
        loader: L,
        debug: bool,
    ) -> Self {
        Self {
            resources: resources.into(),
            manifests: ManifestStore::new(manifest_root),
            storage,
            loader,
            debug,
            tracker: DependencyTracker {
                enabled: debug,
                ..DependencyTracker::default()
            },
        }
    }

    /// Returns the route collection, rebuilding and persisting it first if
    /// the persisted copy is missing or stale.
    ///
    /// The returned collection is always read back from storage. A corrupt
    /// entry is discarded and rebuilt once.
    pub fn load(&mut self) -> Result<RouteCollection, CacheError> {
        if !self.is_valid() {
            self.rebuild()?;
            return self.storage.read();
        }

        match self.storage.read() {
            Err(err) if err.is_corruption() => {
                warn!("Discarding corrupt route cache: {}", err);
                self.rebuild()?;
                self.storage.read()
            }
            result => result,
        }
    }

    /// Checks whether the persisted collection can be used as is.
    ///
    /// Never fails: anything that cannot be checked counts as stale.
    pub fn is_valid(&mut self) -> bool {
        if !self.storage.exists() {
            debug!("No cached route collection");
            return false;
        }

        let written = match self.storage.last_write_time() {
            Ok(time) => time,
            Err(e) => {
                debug!("Cannot read route cache write time: {}", e);
                return false;
            }
        };

        if !self.resources.is_valid(written) {
            debug!("Route resources changed since the cache was written");
            return false;
        }

        if !self.debug {
            return true;
        }

        self.validate_manifest()
    }

    /// Checks every top-level resource's manifest.
    ///
    /// Fails if a manifest is missing or unreadable, or if any file it lists
    /// was modified after the manifest was written.
    pub fn validate_manifest(&mut self) -> bool {
        for resource in self.resources.resources() {
            let path = match self.manifests.manifest_path_for(resource) {
                Ok(path) => path,
                Err(e) => {
                    debug!("Cannot locate manifest for {}: {}", resource.display(), e);
                    return false;
                }
            };

            let Some(written) = modified_time(&path) else {
                debug!("Missing manifest for {}", resource.display());
                return false;
            };

            let collector = match self.manifests.read_manifest(&path) {
                Ok(collector) => collector,
                Err(e) => {
                    warn!("Discarding unreadable manifest for {}: {}", resource.display(), e);
                    return false;
                }
            };

            if !collector.is_valid(written) {
                debug!("Dependencies of {} changed", resource.display());
                return false;
            }
        }

        true
    }

    /// Loads every resource, merges the results, writes manifests in debug
    /// mode, and persists the merged collection.
    pub fn rebuild(&mut self) -> Result<(), CacheError> {
        info!(
            "Rebuilding route cache from {} resource(s)",
            self.resources.len()
        );

        self.tracker.collected.clear();
        self.manifests.forget();

        let result = self.build_collection();
        self.tracker.current = None;
        let collection = result?;

        self.storage.write(&collection)?;
        info!("Wrote route cache with {} route(s)", collection.len());
        Ok(())
    }

    fn build_collection(&mut self) -> Result<RouteCollection, CacheError> {
        let collection = self.load_resources()?;
        if self.debug {
            self.write_manifests()?;
        }
        Ok(collection)
    }

    fn load_resources(&mut self) -> Result<RouteCollection, CacheError> {
        let mut collection = RouteCollection::new();
        for resource in self.resources.resources() {
            self.tracker.current = Some(resource.to_path_buf());
            let routes = self.loader.load(resource, &mut self.tracker)?;
            collection.merge(routes);
        }
        Ok(collection)
    }

    fn write_manifests(&mut self) -> Result<(), CacheError> {
        for resource in self.resources.resources() {
            let path = self.manifests.manifest_path_for(resource)?;
            let collector = self
                .tracker
                .collected
                .entry(resource.to_path_buf())
                .or_default();
            self.manifests.write_manifest(&path, collector)?;
            debug!(
                "Wrote manifest {} with {} dependencies",
                path.display(),
                collector.len()
            );
        }
        Ok(())
    }

    /// The configured top-level resources.
    pub fn resources(&self) -> &FileResourceCollector {
        &self.resources
    }

    /// Whether transitive dependency tracking is enabled.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// The manifest store.
    pub fn manifest_store(&self) -> &ManifestStore {
        &self.manifests
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The resource loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: RouteLoader> RouterCache<FileStorage, L> {
    /// Creates a cache persisted at `config.cache_file` with manifests under
    /// `config.manifest_dir`.
    pub fn from_config(config: &CacheConfig, loader: L) -> Self {
        Self::new(
            config.resources.clone(),
            config.manifest_dir.clone(),
            FileStorage::new(&config.cache_file),
            loader,
            config.debug,
        )
    }
}

/// Files reported outside a rebuild are ignored; during a rebuild they are
/// attributed to the resource being loaded.
impl<S, L> LoadListener for RouterCache<S, L> {
    fn on_file_loaded(&mut self, path: &Path) {
        self.tracker.on_file_loaded(path);
    }
}
