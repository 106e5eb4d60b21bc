//! Per-resource dependency manifests.
//!
//! Each top-level route resource gets one manifest listing every file that
//! was opened while loading it. The manifest lives at a path derived from the
//! resource's location, its content hash and its base name:
//!
//! ```text
//! <root>/<hash[0..2]>/<hash[2..4]>/<hash>_<basename>.manifest
//! ```
//!
//! The hash covers the canonical resource path followed by the file content,
//! so two identical files in different directories never share a manifest.
//! Editing a resource changes its hash, so the old manifest simply stops being
//! looked up. Manifests are JSON, written atomically.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use waypoint_common::ContentHash;

use crate::atomic::write_atomic;
use crate::error::CacheError;
use crate::resource::FileResourceCollector;

/// File extension for manifest files.
pub const MANIFEST_EXT: &str = "manifest";

/// Current manifest format version. Increment on breaking changes.
const MANIFEST_FORMAT_VERSION: u32 = 1;

/// Mode for manifest directories on Unix, before the process umask is
/// applied.
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// On-disk manifest envelope.
#[derive(Debug, Serialize, Deserialize)]
struct ManifestFile {
    format_version: u32,
    resources: FileResourceCollector,
}

/// Locates, reads and writes dependency manifests under a root directory.
#[derive(Debug)]
pub struct ManifestStore {
    /// Root directory for the manifest tree.
    root: PathBuf,

    /// Memoized manifest paths keyed by resource path.
    paths: HashMap<PathBuf, PathBuf>,
}

impl ManifestStore {
    /// Creates a store rooted at `root`. Nothing is created on disk until a
    /// manifest is written.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            paths: HashMap::new(),
        }
    }

    /// The manifest root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the manifest path for the route resource at `resource`.
    ///
    /// The first call for a given path hashes the resource's location and
    /// content; later calls return the memoized answer until
    /// [`forget`](Self::forget) is called. Fails if the resource cannot be
    /// read.
    pub fn manifest_path_for(&mut self, resource: &Path) -> Result<PathBuf, CacheError> {
        if let Some(path) = self.paths.get(resource) {
            return Ok(path.clone());
        }

        let hash = ContentHash::from_located_file(resource).map_err(|e| CacheError::Io {
            path: resource.to_path_buf(),
            source: e,
        })?;
        let path = manifest_path(&self.root, resource, &hash);
        self.paths.insert(resource.to_path_buf(), path.clone());
        Ok(path)
    }

    /// Drops all memoized manifest paths.
    pub fn forget(&mut self) {
        self.paths.clear();
    }

    /// Writes `collector` as the manifest at `path`, creating its directory
    /// if needed.
    pub fn write_manifest(
        &self,
        path: &Path,
        collector: &FileResourceCollector,
    ) -> Result<(), CacheError> {
        if let Some(dir) = path.parent() {
            prepare_dir(dir)?;
        }

        let file = ManifestFile {
            format_version: MANIFEST_FORMAT_VERSION,
            resources: collector.clone(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        write_atomic(path, &json)
    }

    /// Reads the manifest at `path`.
    ///
    /// A missing manifest reads as an empty collector. Unparsable content or
    /// an unknown format version is reported as [`CacheError::Corrupt`].
    pub fn read_manifest(&self, path: &Path) -> Result<FileResourceCollector, CacheError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FileResourceCollector::new());
            }
            Err(e) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let file: ManifestFile =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if file.format_version != MANIFEST_FORMAT_VERSION {
            return Err(CacheError::Corrupt {
                path: path.to_path_buf(),
                reason: format!(
                    "manifest format version {} is not supported (expected {})",
                    file.format_version, MANIFEST_FORMAT_VERSION
                ),
            });
        }

        Ok(file.resources)
    }
}

/// Computes the manifest path for `resource` whose location and content hash
/// to `hash`.
pub fn manifest_path(root: &Path, resource: &Path, hash: &ContentHash) -> PathBuf {
    let hex = hash.to_hex();
    let basename = resource
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    root.join(&hex[..2])
        .join(&hex[2..4])
        .join(format!("{hex}_{basename}.{MANIFEST_EXT}"))
}

/// Creates `dir` if it is missing, otherwise normalizes its permissions.
fn prepare_dir(dir: &Path) -> Result<(), CacheError> {
    if dir.is_dir() {
        normalize_permissions(dir).map_err(|e| CacheError::Permissions {
            path: dir.to_path_buf(),
            source: e,
        })
    } else {
        create_dir(dir).map_err(|e| CacheError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })
    }
}

/// [`DIR_MODE`] restricted by the current process umask.
#[cfg(unix)]
fn dir_mode() -> u32 {
    use nix::sys::stat::{umask, Mode};
    let current = umask(Mode::empty());
    umask(current);
    DIR_MODE & !u32::from(current.bits())
}

#[cfg(unix)]
fn create_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(dir_mode())
        .create(dir)
}

#[cfg(not(unix))]
fn create_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(unix)]
fn normalize_permissions(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(dir_mode()))
}

#[cfg(not(unix))]
fn normalize_permissions(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
