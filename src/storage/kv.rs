// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Plain string key/value persistence
///
/// Implementations apply their own key prefix; callers pass bare keys.
pub trait KeyValueStore: Send + Sync {
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn read(&self, key: &str) -> Option<String>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
    /// Remove every key under this store's prefix
    fn clear(&self) -> Result<(), StorageError>;
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process store, lost at exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    prefix: String,
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        write_lock(&self.entries).insert(self.full_key(key), value.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        read_lock(&self.entries).get(&self.full_key(key)).cloned()
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        write_lock(&self.entries).remove(&self.full_key(key));
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let prefix = &self.prefix;
        write_lock(&self.entries).retain(|k, _| !k.starts_with(prefix.as_str()));
        Ok(())
    }
}

/// JSON-file-backed store
///
/// The whole map is cached in memory and rewritten on every mutation
/// (temp file + rename). Several programs can share one file since every key
/// carries the program prefix.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    prefix: String,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl AsRef<Path>, prefix: impl Into<String>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| StorageError::Io {
                path: path.display().to_string(),
                source,
            })?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?
            }
        } else {
            HashMap::new()
        };

        debug!(
            "Opened credential file {} ({} entries)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            prefix: prefix.into(),
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn mutate(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), StorageError> {
        let mut entries = write_lock(&self.entries);
        f(&mut entries);
        let result = self.persist(&entries);
        if let Err(e) = &result {
            warn!("Failed to persist credential file: {}", e);
        }
        result
    }
}

impl KeyValueStore for FileStore {
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let full_key = self.full_key(key);
        self.mutate(|entries| {
            entries.insert(full_key, value.to_string());
        })
    }

    fn read(&self, key: &str) -> Option<String> {
        read_lock(&self.entries).get(&self.full_key(key)).cloned()
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let full_key = self.full_key(key);
        self.mutate(|entries| {
            entries.remove(&full_key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let prefix = self.prefix.clone();
        self.mutate(|entries| entries.retain(|k, _| !k.starts_with(prefix.as_str())))
    }
}
