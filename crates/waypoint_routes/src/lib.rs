//! Route definitions and the route collection that the cache persists.
//!
//! A [`RouteCollection`] is the compiled artifact produced by loading route
//! resource files. Matching requests against it is out of scope here; this
//! crate only models the data and how collections combine.

#![warn(missing_docs)]

pub mod collection;
pub mod route;

pub use collection::RouteCollection;
pub use route::Route;
