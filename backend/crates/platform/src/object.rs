//! Object Store Abstraction
//!
//! Key-addressed blob storage for book files and cover images.
//! Unlike the cache store, object store failures are real errors: the
//! upload pipeline depends on knowing whether a put/delete succeeded
//! to keep its rollback guarantees.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

/// Object store errors
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// Key contains path traversal or illegal characters
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Underlying storage failure
    #[error("Object store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// Object store contract
///
/// Object-safe (`Arc<dyn ObjectStore>`) so the upload pipeline can be
/// tested against the in-memory implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a blob under a key, overwriting any existing blob.
    async fn put(&self, key: &str, bytes: &[u8]) -> ObjectStoreResult<()>;

    /// Fetch a blob. `None` when the key does not exist.
    async fn get(&self, key: &str) -> ObjectStoreResult<Option<Vec<u8>>>;

    /// Delete a blob. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> ObjectStoreResult<()>;

    /// Existence check without fetching the payload.
    async fn exists(&self, key: &str) -> ObjectStoreResult<bool>;
}

/// Validate an object key: relative, slash-separated, no traversal.
fn validate_key(key: &str) -> ObjectStoreResult<()> {
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return Err(ObjectStoreError::InvalidKey(key.to_string()));
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(ObjectStoreError::InvalidKey(key.to_string()));
        }
    }
    Ok(())
}

/// Turn an original filename into a safe key segment.
///
/// Keeps ASCII alphanumerics, `.`, `-`, `_`; everything else becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// Filesystem implementation
// ============================================================================

/// Filesystem-backed object store
///
/// Keys map to paths under a fixed root directory; `validate_key`
/// guarantees the path cannot escape the root.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> ObjectStoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(Path::new(key)))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> ObjectStoreResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> ObjectStoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> ObjectStoreResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> ObjectStoreResult<bool> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// In-memory object store (tests and single-instance dev)
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    blobs: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> ObjectStoreResult<()> {
        validate_key(key)?;
        self.blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> ObjectStoreResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.blobs.get(key).map(|b| b.clone()))
    }

    async fn delete(&self, key: &str) -> ObjectStoreResult<()> {
        validate_key(key)?;
        self.blobs.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> ObjectStoreResult<bool> {
        validate_key(key)?;
        Ok(self.blobs.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(validate_key("books/../etc/passwd").is_err());
        assert!(validate_key("/absolute").is_err());
        assert!(validate_key("trailing/").is_err());
        assert!(validate_key("double//slash").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("books/b1/file.pdf").is_ok());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Book (final).PDF"), "my_book__final_.pdf");
        assert_eq!(sanitize_filename("../../evil"), "_.._evil");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[tokio::test]
    async fn test_memory_put_get_delete() {
        let store = MemoryObjectStore::new();
        store.put("books/b1/file.pdf", b"%PDF-1.4").await.unwrap();
        assert!(store.exists("books/b1/file.pdf").await.unwrap());
        assert_eq!(
            store.get("books/b1/file.pdf").await.unwrap(),
            Some(b"%PDF-1.4".to_vec())
        );

        store.delete("books/b1/file.pdf").await.unwrap();
        assert!(!store.exists("books/b1/file.pdf").await.unwrap());
        // Deleting a missing key is fine
        store.delete("books/b1/file.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_fs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        store.put("covers/b1/cover.png", b"\x89PNG").await.unwrap();
        assert!(store.exists("covers/b1/cover.png").await.unwrap());
        assert_eq!(
            store.get("covers/b1/cover.png").await.unwrap(),
            Some(b"\x89PNG".to_vec())
        );
        store.delete("covers/b1/cover.png").await.unwrap();
        assert_eq!(store.get("covers/b1/cover.png").await.unwrap(), None);
    }
}
