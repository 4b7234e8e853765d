//! Metadata store trait

use async_trait::async_trait;
use galleria_core::{AppError, MediaRecord, RecordUpdate, StorageType};

/// Metadata record store
///
/// The generated filename is the only lookup key. Insert happens exclusively
/// after artifact placement succeeds; `update_storage` is reserved for the
/// migration tool and `update_details` for the edit surface, so neither can
/// cross into the other's fields.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Insert one record. The filename must be unused.
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError>;

    /// Look up a record by its storage filename.
    async fn get(&self, filename: &str) -> Result<Option<MediaRecord>, AppError>;

    /// All records, newest upload first.
    async fn list(&self) -> Result<Vec<MediaRecord>, AppError>;

    /// Mutate descriptive fields only. Returns the updated record, or `None`
    /// if the filename is unknown.
    async fn update_details(
        &self,
        filename: &str,
        update: &RecordUpdate,
    ) -> Result<Option<MediaRecord>, AppError>;

    /// Rewrite storage fields after a verified migration copy.
    async fn update_storage(
        &self,
        filename: &str,
        url: &str,
        thumbnail: Option<&str>,
        storage_type: StorageType,
    ) -> Result<(), AppError>;

    /// Remove a record. Returns whether a record existed.
    async fn delete(&self, filename: &str) -> Result<bool, AppError>;

    /// Records whose artifacts still live on local disk, including legacy
    /// records with no storage tag.
    async fn list_local(&self) -> Result<Vec<MediaRecord>, AppError>;
}
