//! File system watching for the binding store file
//!
//! Uses the `notify` crate with debouncing to detect edits made to the store
//! file by other processes (or by hand) and reload the store, which in turn
//! fires its change signal.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind, Debouncer};

use super::memory::KeyBindingStore;
use crate::error::StoreError;

type DebounceResult = Result<Vec<DebouncedEvent>, notify::Error>;

/// Debounced watcher for one store file
///
/// Watches the file's directory rather than the file itself, since editors
/// and [`super::save_store_file`] replace the file through a rename.
pub struct StoreWatcher {
    /// The debouncer handles watching and event coalescing
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    /// Receiver for debounced events
    rx: Receiver<DebounceResult>,
    path: PathBuf,
    file_name: OsString,
}

impl StoreWatcher {
    /// Start watching a store file
    pub fn new(path: &Path, debounce: Duration) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| notify::Error::generic("store path has no file name"))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut debouncer = new_debouncer(debounce, tx)?;
        debouncer
            .watcher()
            .watch(&dir, notify::RecursiveMode::NonRecursive)?;

        tracing::info!("Watching binding store {}", path.display());

        Ok(Self {
            _debouncer: debouncer,
            rx,
            path: path.to_path_buf(),
            file_name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending events (non-blocking); true if the store file changed
    pub fn poll(&self) -> bool {
        let mut changed = false;

        while let Ok(result) = self.rx.try_recv() {
            match result {
                Ok(events) => {
                    changed |= events.iter().any(|event| self.is_store_event(event));
                }
                Err(e) => {
                    tracing::warn!("Binding store watcher error: {:?}", e);
                }
            }
        }

        changed
    }

    /// Poll, and reload the store if its file changed
    ///
    /// Returns whether the store's records changed.
    pub fn poll_and_reload(&self, store: &KeyBindingStore) -> Result<bool, StoreError> {
        if self.poll() {
            tracing::debug!("Binding store file changed on disk");
            store.reload()
        } else {
            Ok(false)
        }
    }

    fn is_store_event(&self, event: &DebouncedEvent) -> bool {
        match event.kind {
            // Continuous events during active changes - wait for the final one
            DebouncedEventKind::AnyContinuous => false,
            _ => event.path.file_name() == Some(self.file_name.as_os_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_path_without_file_name() {
        assert!(StoreWatcher::new(Path::new("/"), Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_poll_without_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.yaml");
        let watcher = StoreWatcher::new(&path, Duration::from_millis(50)).unwrap();
        assert!(!watcher.poll());
        assert_eq!(watcher.path(), path.as_path());
    }
}
