//! Route collection persisted as a single validated binary file.
//!
//! The file is a 4-byte little-endian header length, a bincode header with
//! magic bytes, format version, producer version and payload checksum, and
//! then the bincode-encoded [`RouteCollection`]. Anything that does not
//! validate is reported as [`CacheError::Corrupt`] so the caller can rebuild.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use waypoint_common::ContentHash;
use waypoint_routes::RouteCollection;

use crate::atomic::write_atomic;
use crate::error::CacheError;
use crate::storage::RouteStorage;

/// Magic bytes identifying a Waypoint route cache file.
const CACHE_MAGIC: [u8; 4] = *b"WYPT";

/// Current cache file format version. Increment on breaking changes to the
/// header or payload layout.
const CACHE_FORMAT_VERSION: u32 = 1;

/// Version of this crate, recorded in every header.
const PRODUCER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header prepended to every cache file for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheHeader {
    /// Magic bytes: must be `b"WYPT"`.
    magic: [u8; 4],

    /// Cache file format version.
    format_version: u32,

    /// Crate version that produced the file.
    producer_version: String,

    /// Content hash of the payload.
    checksum: ContentHash,
}

/// Stores the compiled route collection in one file.
///
/// The last write time is the file's modification time.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Creates a storage backed by the file at `path`. Nothing is created
    /// until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: impl Into<String>) -> CacheError {
        CacheError::Corrupt {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn io(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn encode(routes: &RouteCollection) -> Result<Vec<u8>, CacheError> {
        let config = bincode::config::standard();
        let payload = bincode::serde::encode_to_vec(routes, config).map_err(|e| {
            CacheError::Serialization {
                reason: e.to_string(),
            }
        })?;

        let header = CacheHeader {
            magic: CACHE_MAGIC,
            format_version: CACHE_FORMAT_VERSION,
            producer_version: PRODUCER_VERSION.to_string(),
            checksum: ContentHash::from_bytes(&payload),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, config).map_err(|e| {
            CacheError::Serialization {
                reason: e.to_string(),
            }
        })?;

        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(&payload);
        Ok(output)
    }

    fn decode(&self, raw: &[u8]) -> Result<RouteCollection, CacheError> {
        let config = bincode::config::standard();

        if raw.len() < 4 {
            return Err(self.corrupt("file too short for header length"));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&raw[..4]);
        let header_len = u32::from_le_bytes(len_bytes) as usize;
        if raw.len() - 4 < header_len {
            return Err(self.corrupt("truncated header"));
        }

        let (header, _): (CacheHeader, usize) =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], config)
                .map_err(|e| self.corrupt(format!("unreadable header: {e}")))?;

        if header.magic != CACHE_MAGIC {
            return Err(self.corrupt("bad magic bytes"));
        }
        if header.format_version != CACHE_FORMAT_VERSION {
            return Err(self.corrupt(format!(
                "format version {} is not supported (expected {})",
                header.format_version, CACHE_FORMAT_VERSION
            )));
        }
        if header.producer_version != PRODUCER_VERSION {
            return Err(self.corrupt(format!(
                "written by version {}, current version is {}",
                header.producer_version, PRODUCER_VERSION
            )));
        }

        let payload = &raw[4 + header_len..];
        let actual = ContentHash::from_bytes(payload);
        if actual != header.checksum {
            return Err(self.corrupt(format!(
                "checksum mismatch: expected {}, got {}",
                header.checksum, actual
            )));
        }

        let (routes, _): (RouteCollection, usize) =
            bincode::serde::decode_from_slice(payload, config)
                .map_err(|e| self.corrupt(format!("unreadable route collection: {e}")))?;
        Ok(routes)
    }
}

impl RouteStorage for FileStorage {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn last_write_time(&self) -> Result<SystemTime, CacheError> {
        std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| self.io(e))
    }

    fn read(&self) -> Result<RouteCollection, CacheError> {
        let raw = std::fs::read(&self.path).map_err(|e| self.io(e))?;
        self.decode(&raw)
    }

    fn write(&mut self, routes: &RouteCollection) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| CacheError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        let bytes = Self::encode(routes)?;
        write_atomic(&self.path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_routes::Route;

    fn sample_routes() -> RouteCollection {
        let mut routes = RouteCollection::new();
        routes.add("home", Route::new("/").with_methods(["GET"]));
        routes.add(
            "post",
            Route::new("/blog/{slug}")
                .with_host("blog.example.com")
                .with_requirement("slug", "[a-z-]+")
                .with_default("_controller", "blog.show"),
        );
        routes
    }

    fn make_storage() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("cache").join("routes.bin"));
        (dir, storage)
    }

    fn write_raw(storage: &FileStorage, header: &CacheHeader, payload: &[u8]) {
        let header_bytes =
            bincode::serde::encode_to_vec(header, bincode::config::standard()).unwrap();
        let mut output = Vec::new();
        output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(payload);
        std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        std::fs::write(storage.path(), output).unwrap();
    }

    fn valid_payload() -> Vec<u8> {
        bincode::serde::encode_to_vec(&sample_routes(), bincode::config::standard()).unwrap()
    }

    fn header_for(payload: &[u8]) -> CacheHeader {
        CacheHeader {
            magic: CACHE_MAGIC,
            format_version: CACHE_FORMAT_VERSION,
            producer_version: PRODUCER_VERSION.to_string(),
            checksum: ContentHash::from_bytes(payload),
        }
    }

    #[test]
    fn write_and_read_roundtrip() {
        let (_dir, mut storage) = make_storage();
        assert!(!storage.exists());

        storage.write(&sample_routes()).unwrap();
        assert!(storage.exists());
        assert_eq!(storage.read().unwrap(), sample_routes());
    }

    #[test]
    fn last_write_time_tracks_file_mtime() {
        let (_dir, mut storage) = make_storage();
        storage.write(&sample_routes()).unwrap();
        let mtime = std::fs::metadata(storage.path()).unwrap().modified().unwrap();
        assert_eq!(storage.last_write_time().unwrap(), mtime);
    }

    #[test]
    fn missing_file_is_io_error() {
        let (_dir, storage) = make_storage();
        assert!(matches!(storage.read(), Err(CacheError::Io { .. })));
        assert!(matches!(storage.last_write_time(), Err(CacheError::Io { .. })));
    }

    #[test]
    fn garbage_is_corrupt() {
        let (_dir, storage) = make_storage();
        std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        std::fs::write(storage.path(), b"garbage data").unwrap();
        assert!(storage.read().unwrap_err().is_corruption());
    }

    #[test]
    fn truncated_header_length_is_corrupt() {
        let (_dir, storage) = make_storage();
        std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        std::fs::write(storage.path(), b"AB").unwrap();
        assert!(storage.read().unwrap_err().is_corruption());
    }

    #[test]
    fn wrong_magic_is_corrupt() {
        let (_dir, storage) = make_storage();
        let payload = valid_payload();
        let mut header = header_for(&payload);
        header.magic = *b"BAAD";
        write_raw(&storage, &header, &payload);
        assert!(storage.read().unwrap_err().is_corruption());
    }

    #[test]
    fn wrong_format_version_is_corrupt() {
        let (_dir, storage) = make_storage();
        let payload = valid_payload();
        let mut header = header_for(&payload);
        header.format_version = 999;
        write_raw(&storage, &header, &payload);
        let err = storage.read().unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { ref reason, .. } if reason.contains("999")));
    }

    #[test]
    fn other_producer_version_is_corrupt() {
        let (_dir, storage) = make_storage();
        let payload = valid_payload();
        let mut header = header_for(&payload);
        header.producer_version = "0.0.0-old".to_string();
        write_raw(&storage, &header, &payload);
        assert!(storage.read().unwrap_err().is_corruption());
    }

    #[test]
    fn checksum_mismatch_is_corrupt() {
        let (_dir, storage) = make_storage();
        let header = header_for(&valid_payload());
        write_raw(&storage, &header, b"tampered");
        let err = storage.read().unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { ref reason, .. } if reason.contains("checksum")));
    }

    #[test]
    fn overwrite_replaces_entry() {
        let (_dir, mut storage) = make_storage();
        storage.write(&sample_routes()).unwrap();
        let mut smaller = RouteCollection::new();
        smaller.add("only", Route::new("/only"));
        storage.write(&smaller).unwrap();
        assert_eq!(storage.read().unwrap(), smaller);
    }

    #[test]
    fn empty_collection_roundtrips() {
        let (_dir, mut storage) = make_storage();
        storage.write(&RouteCollection::new()).unwrap();
        assert!(storage.read().unwrap().is_empty());
    }
}
