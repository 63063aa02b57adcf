//! Storage abstraction for the annotation cache

use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Abstract key/value storage provider.
///
/// Writers of the same path may race; every write must replace the whole
/// value atomically so readers never observe a torn entry.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read data from the given path
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Write data to the given path, replacing any previous value
    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Check if a path exists
    async fn exists(&self, path: &str) -> StorageResult<bool>;
}

/// Local filesystem storage provider
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage provider with the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Safely resolve a path, preventing path traversal attacks
    fn full_path(&self, path: &str) -> StorageResult<PathBuf> {
        let mut normalized = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(c) => normalized.push(c),
                Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                    return Err(StorageError::BackendError(
                        "Path traversal attempt detected".to_string(),
                    ));
                }
            }
        }

        if normalized.as_os_str().is_empty() {
            return Err(StorageError::BackendError(format!("Empty path: {:?}", path)));
        }
        Ok(self.root.join(normalized))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let full_path = self.full_path(path)?;
        tokio::fs::read(full_path)
            .await
            .map_err(|e| StorageError::NotFound(e.to_string()))
    }

    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()> {
        let full_path = self.full_path(path)?;
        let parent = full_path.parent().unwrap_or(&self.root).to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        // Same directory as the target so the rename stays on one filesystem
        let temp = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&temp, data)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        if let Err(e) = tokio::fs::rename(&temp, &full_path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StorageError::BackendError(e.to_string()));
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full_path = self.full_path(path)?;
        tokio::fs::try_exists(full_path)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }
}

/// In-memory storage provider (for testing)
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::BackendError("memory storage lock poisoned".to_string())
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        self.data
            .read()
            .map_err(|_| poisoned())?
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()> {
        self.data
            .write()
            .map_err(|_| poisoned())?
            .insert(path.to_string(), data);
        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.data.read().map_err(|_| poisoned())?.contains_key(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();

        storage.write("test.txt", b"hello".to_vec()).await.unwrap();
        assert_eq!(storage.read("test.txt").await.unwrap(), b"hello");
        assert!(storage.exists("test.txt").await.unwrap());
        assert!(!storage.exists("missing.txt").await.unwrap());
        assert!(matches!(
            storage.read("missing.txt").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_local_storage_overwrites_atomically() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write("nested/key.json", b"first".to_vec()).await.unwrap();
        storage.write("nested/key.json", b"second".to_vec()).await.unwrap();

        assert_eq!(storage.read("nested/key.json").await.unwrap(), b"second");
        let entries = std::fs::read_dir(dir.path().join("nested")).unwrap().count();
        assert_eq!(entries, 1, "temp files must not linger");
    }

    #[tokio::test]
    async fn test_local_storage_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("cache"));

        assert!(storage.write("../escape.json", b"x".to_vec()).await.is_err());
        assert!(storage.read("/etc/passwd").await.is_err());
        assert!(!dir.path().join("escape.json").exists());
    }
}
