//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One entry of a backend listing. Filtering is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub name: String,
    pub is_directory: bool,
}

impl StorageEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
        }
    }
}

/// Storage abstraction trait
///
/// Both backends (remote CDN, local filesystem) implement this trait so the upload
/// pipeline can walk an explicit fallback chain without knowing which one it talks to.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `storage_key` and return the public URL for it.
    ///
    /// The URL is only returned once the backend has acknowledged the write.
    async fn put(&self, data: Bytes, storage_key: &str, content_type: &str)
        -> StorageResult<String>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// List the direct children of `prefix`, in backend order
    async fn list(&self, prefix: &str) -> StorageResult<Vec<StorageEntry>>;

    /// Public URL an object stored under `storage_key` is served from
    fn public_url(&self, storage_key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
