//! Backends that persist the compiled route collection.

use std::time::SystemTime;

use waypoint_routes::RouteCollection;

use crate::error::CacheError;

/// Persistence for the single cache entry a [`RouterCache`](crate::RouterCache)
/// manages.
pub trait RouteStorage {
    /// Returns `true` if an entry has been written.
    fn exists(&self) -> bool;

    /// When the current entry was written.
    fn last_write_time(&self) -> Result<SystemTime, CacheError>;

    /// Reads the current entry.
    fn read(&self) -> Result<RouteCollection, CacheError>;

    /// Replaces the current entry with `routes`.
    fn write(&mut self, routes: &RouteCollection) -> Result<(), CacheError>;
}

/// Keeps the entry in process memory.
///
/// Useful when start-up parsing is cheap enough but repeated `load()` calls
/// within one process should not re-parse.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entry: Option<(RouteCollection, SystemTime)>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage that already holds `routes`, written at `written_at`.
    pub fn with_entry(routes: RouteCollection, written_at: SystemTime) -> Self {
        Self {
            entry: Some((routes, written_at)),
        }
    }

    /// Drops the stored entry.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}

impl RouteStorage for MemoryStorage {
    fn exists(&self) -> bool {
        self.entry.is_some()
    }

    fn last_write_time(&self) -> Result<SystemTime, CacheError> {
        self.entry.as_ref().map(|(_, t)| *t).ok_or(CacheError::Empty)
    }

    fn read(&self) -> Result<RouteCollection, CacheError> {
        self.entry
            .as_ref()
            .map(|(routes, _)| routes.clone())
            .ok_or(CacheError::Empty)
    }

    fn write(&mut self, routes: &RouteCollection) -> Result<(), CacheError> {
        self.entry = Some((routes.clone(), SystemTime::now()));
        Ok(())
    }
}
