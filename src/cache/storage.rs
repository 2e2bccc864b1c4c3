//! Persistent Storage Module
//!
//! The second cache tier. Every backend is best-effort: a failed read is an
//! absent entry and a failed write only costs the persisted copy.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::StorageError;

/// Key/value string storage shared across gateway restarts.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns the raw stored value, or `None` when absent or unreadable.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// == No Storage ==
/// Memory-only caching: nothing is persisted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStorage;

#[async_trait]
impl Storage for NoStorage {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

// == Memory Storage ==
/// In-process map, mostly useful in tests and as a stand-in for browser storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map(|values| values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// == File Storage ==
/// One file per key inside a directory.
///
/// File names are the SHA-256 of the key so any key, however long, maps to
/// a name the filesystem accepts. The full key is stored with the value and
/// checked on read; a mismatch reads as absent.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct StoredValue {
    key: String,
    value: String,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.dir.join(format!("{:x}.json", hasher.finalize()))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Option<String> {
        let raw = tokio::fs::read_to_string(self.path_for(key)).await.ok()?;
        let stored: StoredValue = serde_json::from_str(&raw).ok()?;
        (stored.key == key).then_some(stored.value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let contents = serde_json::to_vec(&StoredValue {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        let dir = self.dir.clone();
        let path = self.path_for(key);

        tokio::task::spawn_blocking(move || write_replacing(&dir, &path, &contents))
            .await
            .map_err(|err| StorageError::Unavailable(err.to_string()))?
    }
}

// Each write gets its own temp file, renamed over the target when complete.
fn write_replacing(dir: &Path, path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_storage_never_returns() {
        let storage = NoStorage;
        storage.set("k", "v").await.unwrap();
        assert!(storage.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_storage_overwrite() {
        let storage = MemoryStorage::new();
        storage.set("k", "v1").await.unwrap();
        storage.set("k", "v2").await.unwrap();

        assert_eq!(storage.get("k").await.as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let storage = FileStorage::new(dir.path());
        storage
            .set("pkd_divisions_B_2025", r#"{"ts":1,"data":[]}"#)
            .await
            .unwrap();

        let reopened = FileStorage::new(dir.path());
        assert_eq!(
            reopened.get("pkd_divisions_B_2025").await.as_deref(),
            Some(r#"{"ts":1,"data":[]}"#)
        );
        assert!(reopened.get("pkd_divisions_C_2025").await.is_none());
    }

    #[tokio::test]
    async fn test_file_storage_keys_with_separators() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("pkd_classifications/risky_~", "a").await.unwrap();
        storage.set("pkd_classifications_risky_~", "b").await.unwrap();

        assert_eq!(storage.get("pkd_classifications/risky_~").await.as_deref(), Some("a"));
        assert_eq!(storage.get("pkd_classifications_risky_~").await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_file_storage_long_compare_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let codes: Vec<String> = (1..=40).map(|n| format!("{:02}", n)).collect();
        let key = format!("pkd_compare_{}_2015-2020_2025", codes.join(","));
        assert!(key.len() > 128);

        storage.set(&key, r#"{"ts":1,"data":{}}"#).await.unwrap();

        assert_eq!(storage.get(&key).await.as_deref(), Some(r#"{"ts":1,"data":{}}"#));
    }

    #[tokio::test]
    async fn test_file_storage_key_mismatch_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("pkd_sections_2025", "v").await.unwrap();

        // Same file, different key inside
        let stolen = std::fs::read_to_string(storage.path_for("pkd_sections_2025")).unwrap();
        std::fs::write(storage.path_for("pkd_sections_2007"), stolen).unwrap();

        assert!(storage.get("pkd_sections_2007").await.is_none());
        assert_eq!(storage.get("pkd_sections_2025").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_file_storage_concurrent_writes_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = std::sync::Arc::new(FileStorage::new(dir.path()));

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let storage = storage.clone();
                tokio::spawn(async move { storage.set("k", &format!("v{}", n)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let value = storage.get("k").await.unwrap();
        assert!(value.starts_with('v'));
        // Only the final file remains, no temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_file_storage_unwritable_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();

        let storage = FileStorage::new(&blocker);
        assert!(storage.set("k", "v").await.is_err());
        assert!(storage.get("k").await.is_none());
    }
}
