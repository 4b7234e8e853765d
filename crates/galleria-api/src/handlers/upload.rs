//! Upload handler
//!
//! Parses the multipart form (`files[]`, `password`, optional `metadata`) and
//! hands the batch to the upload pipeline. The metadata field is JSON: either
//! one object applied to all files or an array applied positionally.

use axum::{
    extract::{Multipart, State},
    Json,
};
use galleria_core::{AppError, MediaRecord, StorageType, UploadMetadata};
use serde::Serialize;
use std::sync::Arc;

use crate::error::HttpGalleryError;
use crate::services::upload::{FileFailure, IncomingFile, UploadService};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<MediaRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
    pub message: String,
    pub storage_type: StorageType,
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpGalleryError> {
    let mut password: Option<String> = None;
    let mut metadata: Option<UploadMetadata> = None;
    let mut files: Vec<IncomingFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart form: {}", e)))?
    {
        match field.name() {
            Some("password") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid password field: {}", e)))?;
                password = Some(value);
            }
            Some("metadata") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid metadata field: {}", e)))?;
                let parsed: UploadMetadata = serde_json::from_str(&text).map_err(|e| {
                    AppError::InvalidInput(format!("Metadata must be a JSON object or array: {}", e))
                })?;
                metadata = Some(parsed);
            }
            Some("files") | Some("files[]") | Some("file") => {
                let original_filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::InvalidInput("File field has no filename".to_string()))?;
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::InvalidInput(format!("Failed to read uploaded file: {}", e))
                    })?
                    .to_vec();

                files.push(IncomingFile {
                    original_filename,
                    content_type,
                    data,
                });
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    let service = UploadService::new(state);
    let outcome = service
        .upload_batch(password.as_deref(), files, metadata)
        .await?;

    let message = if outcome.failures.is_empty() {
        format!("Uploaded {} file(s)", outcome.records.len())
    } else {
        format!(
            "Uploaded {} file(s), {} failed",
            outcome.records.len(),
            outcome.failures.len()
        )
    };

    Ok(Json(UploadResponse {
        success: true,
        files: outcome.records,
        failures: outcome.failures,
        message,
        storage_type: outcome.storage_type,
    }))
}
