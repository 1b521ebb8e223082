//! Persistent key-value storage.
//!
//! DESIGN
//! ======
//! Mirrors the browser `localStorage` contract: string keys, string values,
//! synchronous calls. `SessionState` writes through on every mutation, so
//! `FileStorage` rewrites the whole file on each `set_item`/`remove_item`.
//! The in-memory map only changes after the new contents reach disk, so a
//! failed write leaves both copies as they were.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

/// String key-value storage shared by client state objects.
pub trait Storage: Send + Sync {
    /// Read a value, or `None` when the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().map_or(0, |items| items.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Storage backed by a single JSON object file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or is not a JSON
    /// object of string values.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let items = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = items.len(), "opened file storage");
        Ok(Self { path, items: Mutex::new(items) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(items)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        let mut next = items.clone();
        next.insert(key.to_owned(), value.to_owned());
        self.flush(&next)?;
        *items = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.flush(&next)?;
        *items = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
