//! Content hashing for manifest addressing and artifact integrity checks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A 128-bit content hash computed using XXH3.
///
/// Two inputs with the same `ContentHash` are assumed to be identical.
/// Manifest paths are derived from the located hash of the resource they
/// describe, so editing a resource moves its manifest to a new location.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_be_bytes())
    }

    /// Reads the file at `path` and hashes its canonical location, a NUL
    /// separator, then its full content.
    ///
    /// Identical files in different directories hash differently. If the
    /// path cannot be canonicalized it is hashed as given.
    pub fn from_located_file(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        let location = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        let mut keyed = location.to_string_lossy().into_owned().into_bytes();
        keyed.push(0);
        keyed.extend_from_slice(&content);
        Ok(Self::from_bytes(&keyed))
    }

    /// Returns the lowercase hex rendering of the hash (32 characters).
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"routes");
        let b = ContentHash::from_bytes(b"routes");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_bytes(b"home: /");
        let b = ContentHash::from_bytes(b"home: /index");
        assert_ne!(a, b);
    }

    #[test]
    fn hex_is_32_lowercase_chars() {
        let h = ContentHash::from_bytes(b"test");
        let s = h.to_hex();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(s, format!("{h}"));
    }

    #[test]
    fn debug_abbreviated() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h:?}");
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with("..)"));
    }

    #[test]
    fn located_file_keys_on_path_and_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        let a = dir.path().join("a").join("routes.toml");
        let b = dir.path().join("b").join("routes.toml");
        std::fs::write(&a, "[routes.home]\npath = \"/\"\n").unwrap();
        std::fs::write(&b, "[routes.home]\npath = \"/\"\n").unwrap();

        let first = ContentHash::from_located_file(&a).unwrap();
        assert_eq!(first, ContentHash::from_located_file(&a).unwrap());
        assert_ne!(first, ContentHash::from_located_file(&b).unwrap());

        let mut keyed = std::fs::canonicalize(&a)
            .unwrap()
            .to_string_lossy()
            .into_owned()
            .into_bytes();
        keyed.push(0);
        keyed.extend_from_slice(b"[routes.home]\npath = \"/\"\n");
        assert_eq!(first, ContentHash::from_bytes(&keyed));

        std::fs::write(&a, "[routes.home]\npath = \"/home\"\n").unwrap();
        assert_ne!(first, ContentHash::from_located_file(&a).unwrap());
    }

    #[test]
    fn located_file_missing_errors() {
        assert!(ContentHash::from_located_file(Path::new("/nonexistent/routes.toml")).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
