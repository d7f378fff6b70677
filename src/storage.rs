//! # Persisted storage
//!
//! A string key-value store modelled on browser local storage. The session
//! keeps its whole snapshot under a single key. Writes are synchronous.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Key-value storage backend used to persist session snapshots
pub trait KeyValueStorage {
    /// Read the value stored under `key`, if any
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing a missing key is not an error
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Directory-backed storage: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `root`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| StorageError::Unavailable {
            reason: format!("cannot create {}: {}", root.display(), e),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Unavailable {
                reason: format!("unsupported storage key '{}'", key),
            });
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // written beside the target, then renamed over it
        let tmp = path.with_extension("json.tmp");
        let written = fs::write(&tmp, value).and_then(|_| fs::rename(&tmp, &path));
        if written.is_err() && tmp.exists() {
            if let Err(e) = fs::remove_file(&tmp) {
                tracing::debug!(path = %tmp.display(), error = %e, "Could not remove temp file");
            }
        }
        written.map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item("workouts").unwrap(), None);

        storage.set_item("workouts", "[]").unwrap();
        assert_eq!(storage.get_item("workouts").unwrap().as_deref(), Some("[]"));

        storage.remove_item("workouts").unwrap();
        storage.remove_item("workouts").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let temp_dir = tempdir().unwrap();
        let mut storage = FileStorage::open(temp_dir.path().join("nested")).unwrap();

        assert_eq!(storage.get_item("workouts").unwrap(), None);
        storage.set_item("workouts", "[1]").unwrap();
        storage.set_item("workouts", "[2]").unwrap();
        assert_eq!(storage.get_item("workouts").unwrap().as_deref(), Some("[2]"));
        assert!(storage.root().join("workouts.json").exists());

        storage.remove_item("workouts").unwrap();
        assert_eq!(storage.get_item("workouts").unwrap(), None);
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let temp_dir = tempdir().unwrap();
        let mut storage = FileStorage::open(temp_dir.path()).unwrap();

        // a non-empty directory at the target path makes the rename fail
        let blocker = temp_dir.path().join("workouts.json");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let err = storage.set_item("workouts", "[]").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(!temp_dir.path().join("workouts.json.tmp").exists());
        assert!(blocker.join("keep").exists());
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let temp_dir = tempdir().unwrap();
        let storage = FileStorage::open(temp_dir.path()).unwrap();
        assert!(storage.get_item("../escape").is_err());
        assert!(storage.get_item("").is_err());
    }
}
