//! Persistent cache for compiled route collections.
//!
//! [`RouterCache`] loads a fixed set of route resource files into a single
//! [`RouteCollection`](waypoint_routes::RouteCollection), persists it through a
//! [`RouteStorage`] backend, and on later start-ups returns the persisted copy
//! as long as nothing it was built from has changed.
//!
//! In production mode only the top-level resource timestamps are compared to
//! the cache write time. In debug mode every file the loader opens is recorded
//! in a per-resource manifest (see [`ManifestStore`]) and all of them are
//! checked before the cache is trusted.

#![warn(missing_docs)]

mod atomic;
pub mod error;
pub mod file_storage;
pub mod manifest;
pub mod resource;
pub mod router_cache;
pub mod storage;

pub use error::CacheError;
pub use file_storage::FileStorage;
pub use manifest::ManifestStore;
pub use resource::{FileResource, FileResourceCollector};
pub use router_cache::RouterCache;
pub use storage::{MemoryStorage, RouteStorage};
