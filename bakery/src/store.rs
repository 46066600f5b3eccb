//! Persisted cart blob storage.
//!
//! The whole blob is replaced on every write; there are no partial updates.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};

use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cart store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("cart store unavailable: {0}")]
    Unavailable(String),
}

/// Where the cart blob lives between the catalog and checkout views.
pub trait CartStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved.
    fn read(&self) -> Result<Option<String>, StoreError>;

    fn write(&self, blob: &str) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// A single JSON file, written owner-only on unix.
#[derive(Debug, Clone)]
pub struct FileCartStore {
    path: PathBuf,
}

impl FileCartStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Owner-only (0600) on unix: the blob holds what the shopper is about to order.
fn secure_write(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?
            .write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }

    Ok(())
}

impl CartStore for FileCartStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn read(&self) -> Result<Option<String>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let blob = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if blob.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(blob))
    }

    #[instrument(skip(self, blob), fields(path = %self.path.display(), bytes = blob.len()))]
    fn write(&self, blob: &str) -> Result<(), StoreError> {
        // Write next to the target and rename so readers never see half a blob.
        let staging = self.path.with_extension("tmp");
        secure_write(&staging, blob).map_err(|e| self.io_error(e))?;
        std::fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }
}

/// Process-local store, for tests and sessions without a writable config dir.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    blob: Mutex<Option<String>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StoreError> {
        self.blob
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl CartStore for MemoryCartStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot()?.clone())
    }

    fn write(&self, blob: &str) -> Result<(), StoreError> {
        *self.slot()? = Some(blob.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCartStore::new(dir.path().join("nested").join("cart.json"));

        assert!(store.read().unwrap().is_none());

        store.write("[]").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("[]"));

        store.write(r#"[{"quantity":1}]"#).unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some(r#"[{"quantity":1}]"#));
        assert!(!store.path().with_extension("tmp").exists());

        store.clear().unwrap();
        assert!(store.read().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn blank_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(FileCartStore::new(path).read().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCartStore::new(dir.path().join("cart.json"));
        store.write("[]").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn memory_store_replaces_whole_blob() {
        let store = MemoryCartStore::with_blob("old");
        store.write("new").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("new"));
        store.clear().unwrap();
        assert!(store.read().unwrap().is_none());
    }
}
