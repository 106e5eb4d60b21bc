//! Loading route resource files into route collections.
//!
//! The [`RouteLoader`] trait is the seam the cache drives. Loaders report
//! every file they open through a [`LoadListener`], which is how callers learn
//! about files pulled in indirectly (imports) without understanding the
//! resource format. [`TomlRouteLoader`] is the bundled implementation.

#![warn(missing_docs)]

pub mod error;
pub mod listener;
pub mod loader;
pub mod toml_loader;

pub use error::LoadError;
pub use listener::LoadListener;
pub use loader::RouteLoader;
pub use toml_loader::TomlRouteLoader;
