//! The loader collaborator driven by the route cache.

use std::path::Path;

use waypoint_routes::RouteCollection;

use crate::error::LoadError;
use crate::listener::LoadListener;

/// Parses a route resource, and everything it pulls in, into a collection.
///
/// Implementations must call [`LoadListener::on_file_loaded`] for every file
/// they open during the call, the top-level `resource` included. The
/// listener is lent for the duration of a single load.
pub trait RouteLoader {
    /// Loads `resource` and returns the routes it defines.
    fn load(
        &mut self,
        resource: &Path,
        listener: &mut dyn LoadListener,
    ) -> Result<RouteCollection, LoadError>;
}

impl<L: RouteLoader + ?Sized> RouteLoader for Box<L> {
    fn load(
        &mut self,
        resource: &Path,
        listener: &mut dyn LoadListener,
    ) -> Result<RouteCollection, LoadError> {
        (**self).load(resource, listener)
    }
}
