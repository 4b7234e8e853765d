//! Storage abstraction trait
//!
//! This module defines the Storage trait that both backends implement.

use async_trait::async_trait;
use galleria_core::StorageType;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Both backends (local filesystem, S3-compatible remote) implement this so
/// the upload/delete pipelines and the migration tool can address whichever
/// storage a record lives in without coupling to implementation details.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write data at a storage key and return the public URL for it.
    ///
    /// Upsert semantics: writing to an existing key replaces the object.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String>;

    /// Read the object at a storage key.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete the object at a storage key.
    ///
    /// Idempotent: absence of the object is not an error at this layer.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    ///
    /// "Not found" returns `Ok(false)`; transport or auth failures return
    /// `Err` so callers can tell a missing object from a broken backend.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Compute the public URL for a key without performing I/O.
    ///
    /// Callers never construct URLs themselves; provider-specific URL shapes
    /// are isolated behind this one function.
    fn public_url(&self, key: &str) -> String;

    /// Generate a time-limited access URL (for private buckets).
    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Which storage domain this backend serves.
    fn storage_type(&self) -> StorageType;
}
