//! Filesystem timestamp helpers.

use std::path::Path;
use std::time::SystemTime;

/// Returns the last modification time of the file at `path`.
///
/// Returns `None` if the file does not exist or its metadata cannot be read.
/// Callers treat a missing timestamp the same way as a stale file.
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Returns `true` if the file at `path` was modified after `since`, or if its
/// modification time cannot be determined.
pub fn is_newer_than(path: &Path, since: SystemTime) -> bool {
    match modified_time(path) {
        Some(mtime) => mtime > since,
        None => true,
    }
}
