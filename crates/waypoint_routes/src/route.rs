//! A single named route definition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A route definition: a path pattern plus the constraints a matcher applies.
///
/// Routes are plain data. Pattern compilation and request matching are owned
/// by the matcher that consumes the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    /// Path pattern, always starting with `/` (e.g. `/blog/{slug}`).
    pub path: String,
    /// Allowed HTTP methods, upper-cased. Empty means any method.
    #[serde(default)]
    pub methods: Vec<String>,
    /// Optional host pattern the request host must match.
    #[serde(default)]
    pub host: Option<String>,
    /// Regex requirements keyed by placeholder name.
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,
    /// Default values keyed by placeholder or attribute name.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

impl Route {
    /// Creates a route for `path` that accepts any method on any host.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            methods: Vec::new(),
            host: None,
            requirements: BTreeMap::new(),
            defaults: BTreeMap::new(),
        }
    }

    /// Restricts the route to the given methods. Names are upper-cased and
    /// duplicates dropped.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.as_ref().to_owned())
            .collect();
        self.normalize_methods();
        self
    }

    /// Upper-cases the method list in place and drops duplicates, keeping the
    /// first occurrence of each.
    pub fn normalize_methods(&mut self) {
        let mut seen = Vec::with_capacity(self.methods.len());
        for mut method in self.methods.drain(..) {
            method.make_ascii_uppercase();
            if !seen.contains(&method) {
                seen.push(method);
            }
        }
        self.methods = seen;
    }

    /// Sets the host pattern.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Adds a requirement for the placeholder `name`.
    pub fn with_requirement(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.requirements.insert(name.into(), pattern.into());
        self
    }

    /// Adds a default value for `name`.
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Returns `true` if the route accepts `method` (case-insensitive).
    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Prepends `prefix` to the route path.
    ///
    /// The prefix is normalized to start with `/` and to have no trailing
    /// `/`. An empty or `/` prefix leaves the path untouched.
    pub fn add_prefix(&mut self, prefix: &str) {
        let trimmed = prefix.trim_matches('/');
        if trimmed.is_empty() {
            return;
        }
        self.path = if self.path == "/" {
            format!("/{trimmed}")
        } else {
            format!("/{trimmed}{}", self.path)
        };
    }
}
