//! Notification channel for files opened during a load.

use std::path::{Path, PathBuf};

/// Receives a notification for every file a [`RouteLoader`](crate::RouteLoader)
/// opens while loading a resource, including the requested resource itself.
pub trait LoadListener {
    /// Called once per opened file, in the order files are opened.
    fn on_file_loaded(&mut self, path: &Path);
}

/// Records every notified path.
impl LoadListener for Vec<PathBuf> {
    fn on_file_loaded(&mut self, path: &Path) {
        self.push(path.to_path_buf());
    }
}
