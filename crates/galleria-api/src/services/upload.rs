//! Upload pipeline
//!
//! Batch authentication happens exactly once, before any file is processed.
//! Each file then runs the same sequence: generate a storage key, validate
//! extension + content type + size, persist the primary artifact to the
//! configured target, derive secondary artifacts for videos, and write one
//! metadata record. Any failure aborts only that file; the rest of the batch
//! proceeds, and already-written records are never rolled back.

use chrono::Utc;
use galleria_core::{
    verify_shared_secret, AppError, Dimensions, ErrorMetadata, FileMetadata, MediaKind,
    MediaRecord, StorageType, UploadMetadata,
};
use galleria_processing::{image_dimensions, ValidationError};
use galleria_storage::{generate_key, thumbnail_key, Storage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

use crate::state::AppState;

/// One file extracted from the multipart form.
pub struct IncomingFile {
    pub original_filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Per-file failure reported in the batch response.
#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub filename: String,
    pub code: String,
    pub error: String,
}

/// Result of processing one batch.
pub struct BatchOutcome {
    pub records: Vec<MediaRecord>,
    pub failures: Vec<FileFailure>,
    pub storage_type: StorageType,
}

pub struct UploadService {
    state: Arc<AppState>,
}

impl UploadService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn upload_batch(
        &self,
        password: Option<&str>,
        files: Vec<IncomingFile>,
        metadata: Option<UploadMetadata>,
    ) -> Result<BatchOutcome, AppError> {
        // Batch-level checks: a batch either has valid credentials or none of
        // its files should proceed.
        verify_shared_secret(self.state.config.gallery_password.as_deref(), password)?;

        if files.is_empty() {
            return Err(AppError::InvalidInput("No files uploaded".to_string()));
        }

        let metadata = match metadata {
            Some(meta) => meta.resolve(files.len())?,
            None => vec![FileMetadata::default(); files.len()],
        };

        // One shared timestamp per batch.
        let uploaded_at = Utc::now();
        let storage_type = self.state.storage.upload_target_type();

        let mut records = Vec::with_capacity(files.len());
        let mut failures = Vec::new();

        for (file, meta) in files.into_iter().zip(metadata.into_iter()) {
            let original_filename = file.original_filename.clone();
            match self.process_file(file, meta, uploaded_at).await {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        filename = %original_filename,
                        "File upload failed; continuing with remaining batch"
                    );
                    failures.push(FileFailure {
                        filename: original_filename,
                        code: err.error_code().to_string(),
                        error: err.client_message(),
                    });
                }
            }
        }

        Ok(BatchOutcome {
            records,
            failures,
            storage_type,
        })
    }

    async fn process_file(
        &self,
        file: IncomingFile,
        meta: FileMetadata,
        uploaded_at: chrono::DateTime<Utc>,
    ) -> Result<MediaRecord, AppError> {
        let IncomingFile {
            original_filename,
            content_type,
            data,
        } = file;

        // Validation happens before anything touches storage.
        let kind = self
            .state
            .validator
            .validate(&original_filename, &content_type, data.len())
            .map_err(|e| match e {
                ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
                other => AppError::InvalidInput(other.to_string()),
            })?;

        let storage_key = generate_key(&original_filename);
        let backend = self.state.storage.upload_target();
        let storage_type = backend.storage_type();
        let file_size = data.len() as i64;

        let url = backend
            .put(&storage_key, data.clone(), &content_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let (thumbnail, dimensions) = match kind {
            MediaKind::Image => (None, image_dimensions(&data)),
            MediaKind::Video => {
                self.derive_video_artifacts(backend, &storage_key, &data)
                    .await?
            }
        };

        let record = MediaRecord {
            filename: storage_key.clone(),
            original_filename: original_filename.clone(),
            name: meta.name.unwrap_or_else(|| original_filename.clone()),
            url,
            thumbnail,
            storage_type,
            kind,
            content_type,
            file_size,
            dimensions,
            date: meta.date,
            location: meta.location,
            tags: meta.tags.unwrap_or_default(),
            photographer: meta.photographer,
            uploaded_at,
        };

        if let Err(e) = self.state.store.insert(&record).await {
            // The artifact is already placed; the orphan is accepted, but we
            // still try to clean up off the request path.
            tracing::error!(
                error = %e,
                storage_key = %storage_key,
                "Failed to write media record after artifact placement"
            );
            let backend = backend.clone();
            let thumb_key = record.thumbnail.is_some().then(|| thumbnail_key(&storage_key));
            tokio::spawn(async move {
                if let Err(cleanup_err) = backend.delete(&storage_key).await {
                    tracing::debug!(
                        error = %cleanup_err,
                        storage_key = %storage_key,
                        "Failed to clean up artifact after record-write error"
                    );
                }
                if let Some(thumb_key) = thumb_key {
                    if let Err(cleanup_err) = backend.delete(&thumb_key).await {
                        tracing::debug!(
                            error = %cleanup_err,
                            storage_key = %thumb_key,
                            "Failed to clean up thumbnail after record-write error"
                        );
                    }
                }
            });
            return Err(e);
        }

        Ok(record)
    }

    /// Derive and persist video secondary artifacts.
    ///
    /// Derivation failures are non-fatal: the upload proceeds with neither a
    /// thumbnail nor dimensions (never one without the other). Storage
    /// failures while persisting the derived thumbnail ARE fatal, like any
    /// other upload-path storage error.
    async fn derive_video_artifacts(
        &self,
        backend: &Arc<dyn Storage>,
        storage_key: &str,
        data: &[u8],
    ) -> Result<(Option<String>, Option<Dimensions>), AppError> {
        // The external tool needs a local file. When the primary target is
        // local disk the artifact is already there; otherwise materialize a
        // temporary copy. The guard's Drop removes the temp file on every
        // exit path, including derivation failure.
        let (source_path, _temp_guard): (PathBuf, Option<NamedTempFile>) =
            match backend.storage_type() {
                StorageType::Local => (
                    Path::new(&self.state.config.upload_dir).join(storage_key),
                    None,
                ),
                StorageType::Remote => {
                    let temp = NamedTempFile::new()
                        .map_err(|e| AppError::Internal(format!("Temp file: {}", e)))?;
                    tokio::fs::write(temp.path(), data)
                        .await
                        .map_err(|e| AppError::Internal(format!("Temp file write: {}", e)))?;
                    (temp.path().to_path_buf(), Some(temp))
                }
            };

        let frame = self.state.transcoder.extract_frame(&source_path).await;
        let dims = self.state.transcoder.probe_dimensions(&source_path).await;

        match (frame, dims) {
            (Ok(frame), Ok(dims)) => {
                let thumb_key = thumbnail_key(storage_key);
                let thumb_url = backend
                    .put(&thumb_key, frame, "image/jpeg")
                    .await
                    .map_err(|e| AppError::Storage(e.to_string()))?;
                Ok((Some(thumb_url), Some(dims)))
            }
            (frame, dims) => {
                if let Err(ref e) = frame {
                    tracing::warn!(
                        error = %e,
                        storage_key = %storage_key,
                        "Thumbnail extraction failed; uploading without thumbnail"
                    );
                }
                if let Err(ref e) = dims {
                    tracing::warn!(
                        error = %e,
                        storage_key = %storage_key,
                        "Dimension probe failed; uploading without dimensions"
                    );
                }
                Ok((None, None))
            }
        }
    }
}
