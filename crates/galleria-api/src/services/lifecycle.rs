//! Record lifecycle: deletion and descriptive updates
//!
//! Artifact deletion is best-effort; an orphaned object is preferable to an
//! undeletable gallery entry. Record removal is authoritative.

use galleria_core::{verify_shared_secret, AppError, MediaRecord, RecordUpdate};
use galleria_storage::thumbnail_key;
use std::sync::Arc;

use crate::state::AppState;

pub struct LifecycleService {
    state: Arc<AppState>,
}

impl LifecycleService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Delete a record and its artifacts by storage key.
    pub async fn delete_file(&self, password: Option<&str>, key: &str) -> Result<(), AppError> {
        verify_shared_secret(self.state.config.gallery_password.as_deref(), password)?;

        let record = self
            .state
            .store
            .get(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File not found: {}", key)))?;

        // Artifacts live in whichever backend the record says; failures here
        // are logged, not fatal.
        match self.state.storage.for_type(record.storage_type) {
            Ok(backend) => {
                if let Err(e) = backend.delete(&record.filename).await {
                    tracing::warn!(
                        error = %e,
                        key = %record.filename,
                        "Failed to delete primary artifact; removing record anyway"
                    );
                }
                if record.thumbnail.is_some() {
                    let thumb_key = thumbnail_key(&record.filename);
                    if let Err(e) = backend.delete(&thumb_key).await {
                        tracing::warn!(
                            error = %e,
                            key = %thumb_key,
                            "Failed to delete thumbnail artifact; removing record anyway"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    key = %record.filename,
                    "Storage backend unavailable; removing record without artifact cleanup"
                );
            }
        }

        let removed = self.state.store.delete(key).await?;
        if !removed {
            return Err(AppError::NotFound(format!("File not found: {}", key)));
        }

        tracing::info!(key = %key, "Media record deleted");
        Ok(())
    }

    /// Mutate descriptive fields of a record. Storage fields are not
    /// reachable through this surface.
    pub async fn update_file(
        &self,
        password: Option<&str>,
        key: &str,
        update: RecordUpdate,
    ) -> Result<MediaRecord, AppError> {
        verify_shared_secret(self.state.config.gallery_password.as_deref(), password)?;

        if update.is_empty() {
            return Err(AppError::InvalidInput(
                "No updatable fields provided".to_string(),
            ));
        }

        let record = self
            .state
            .store
            .update_details(key, &update)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File not found: {}", key)))?;

        tracing::info!(key = %key, "Media record updated");
        Ok(record)
    }
}
