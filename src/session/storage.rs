//! Durable key/value storage backing the session store.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode session data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value storage that survives process restarts.
///
/// Implementations must be safe to share across tasks; writes are
/// serialized by the session store.
pub trait SessionStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Write several keys together. The default writes them one by one, in
    /// order; implementations that can commit them at once should.
    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.write(key, value)?;
        }
        Ok(())
    }
}

/// Stores all keys in a single JSON object on disk
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;

        // Write a sibling file, then rename it over the original
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        // Corrupt content is discarded
        let mut entries = self.load().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.load().unwrap_or_default();
        entries.remove(key);
        self.save(&entries)
    }

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut stored = self.load().unwrap_or_default();
        for (key, value) in entries {
            stored.insert(key.to_string(), value.to_string());
        }
        self.save(&stored)
    }
}

/// Process-local storage, used when no durable location is wanted
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("session.json"));

        assert_eq!(storage.read("token").unwrap(), None);
        storage.write("token", "abc").unwrap();
        storage.write("user", "{}").unwrap();
        assert_eq!(storage.read("token").unwrap().as_deref(), Some("abc"));

        // A fresh handle sees the same data
        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.read("user").unwrap().as_deref(), Some("{}"));

        reopened.remove("token").unwrap();
        assert_eq!(storage.read("token").unwrap(), None);
        assert_eq!(storage.read("user").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_storage_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.read("token"),
            Err(StorageError::Corrupt { .. })
        ));

        // Writing replaces the corrupt content
        storage.write("token", "fresh").unwrap();
        assert_eq!(storage.read("token").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_file_storage_remove_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("missing.json"));
        storage.remove("token").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_write_all_is_one_save() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));
        storage.write("token", "old").unwrap();

        storage
            .write_all(&[("user", "{\"id\":2}"), ("token", "new")])
            .unwrap();

        assert_eq!(storage.read("token").unwrap().as_deref(), Some("new"));
        assert_eq!(storage.read("user").unwrap().as_deref(), Some("{\"id\":2}"));
        assert!(!dir.path().join("session.tmp").exists());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.write("token", "t").unwrap();
        assert_eq!(storage.read("token").unwrap().as_deref(), Some("t"));
        storage.remove("token").unwrap();
        assert_eq!(storage.read("token").unwrap(), None);
    }
}
