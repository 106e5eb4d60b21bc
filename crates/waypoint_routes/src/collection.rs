//! Ordered, name-keyed set of routes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::route::Route;

/// An ordered collection of named routes.
///
/// Order matters to matchers (first match wins), so the collection preserves
/// insertion order. Adding a route under an existing name replaces the old
/// definition and moves it to the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCollection {
    routes: IndexMap<String, Route>,
}

impl RouteCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `route` under `name`, replacing and re-positioning any route
    /// previously registered under the same name.
    pub fn add(&mut self, name: impl Into<String>, route: Route) {
        let name = name.into();
        self.routes.shift_remove(&name);
        self.routes.insert(name, route);
    }

    /// Appends every route of `other`, in order. Routes from `other` override
    /// routes of the same name already present.
    pub fn merge(&mut self, other: RouteCollection) {
        for (name, route) in other.routes {
            self.add(name, route);
        }
    }

    /// Prefixes the path of every route in the collection.
    pub fn add_prefix(&mut self, prefix: &str) {
        for route in self.routes.values_mut() {
            route.add_prefix(prefix);
        }
    }

    /// Returns the route registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// Removes and returns the route registered under `name`, keeping the
    /// relative order of the remaining routes.
    pub fn remove(&mut self, name: &str) -> Option<Route> {
        self.routes.shift_remove(name)
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if there are no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over `(name, route)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(name, route)| (name.as_str(), route))
    }

    /// Iterates over route names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Route)> for RouteCollection {
    fn from_iter<T: IntoIterator<Item = (String, Route)>>(iter: T) -> Self {
        let mut collection = Self::new();
        for (name, route) in iter {
            collection.add(name, route);
        }
        collection
    }
}
