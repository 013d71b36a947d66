//! services/api/src/adapters/blob.rs
//!
//! This module contains the blob storage adapter, which is the concrete implementation
//! of the `BlobStore` port from the `core` crate. It stores uploaded documents as
//! plain files under a configurable root directory.

use async_trait::async_trait;
use pitchdeck_core::ports::{BlobStore, PortError, PortResult};
use std::path::{Path, PathBuf};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A blob storage adapter backed by the local filesystem.
///
/// Keys look like `{project_id}/documents/{filename}` and map directly onto
/// paths below the configured root.
#[derive(Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a new `FsBlobStore` rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a storage key to a path under the root, rejecting keys that
    /// would escape it.
    fn resolve(&self, key: &str) -> PortResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                std::path::Component::ParentDir
                    | std::path::Component::RootDir
                    | std::path::Component::Prefix(_)
            )
        });
        if escapes || key.is_empty() {
            return Err(PortError::Unexpected(format!(
                "Invalid storage key '{}'",
                key
            )));
        }
        Ok(self.root.join(relative))
    }
}

//=========================================================================================
// `BlobStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> PortResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> PortResult<Vec<u8>> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PortError::NotFound(format!("Blob '{}' not found", key))
            } else {
                PortError::Unexpected(e.to_string())
            }
        })
    }

    async fn delete_prefix(&self, prefix: &str) -> PortResult<()> {
        let path = self.resolve(prefix)?;
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => Ok(()),
            // Deleting a prefix that was never written to is not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}

//=========================================================================================
// Unit Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.put("p1/documents/plan.txt", b"hello").await.unwrap();
        let data = store.get("p1/documents/plan.txt").await.unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let err = store.get("p1/documents/missing.txt").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_prefix_removes_all_blobs_under_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.put("p1/documents/a.txt", b"a").await.unwrap();
        store.put("p1/documents/b.txt", b"b").await.unwrap();
        store.delete_prefix("p1").await.unwrap();
        let err = store.get("p1/documents/a.txt").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_prefix_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.delete_prefix("never-written").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let err = store.put("../outside.txt", b"x").await.unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}
