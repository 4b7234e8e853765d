//! File listing, update, and deletion handlers

use axum::{
    extract::{Path, State},
    Json,
};
use galleria_core::{MediaRecord, RecordUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{HttpGalleryError, ValidatedJson};
use crate::services::lifecycle::LifecycleService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<MediaRecord>,
}

/// All records, newest upload first.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilesResponse>, HttpGalleryError> {
    let files = state.store.list().await?;
    Ok(Json(FilesResponse { files }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    ValidatedJson(body): ValidatedJson<DeleteRequest>,
) -> Result<Json<ActionResponse>, HttpGalleryError> {
    let service = LifecycleService::new(state);
    service.delete_file(body.password.as_deref(), &key).await?;

    Ok(Json(ActionResponse {
        success: true,
        message: format!("Deleted {}", key),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub password: Option<String>,
    #[serde(flatten)]
    pub update: RecordUpdate,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub file: MediaRecord,
}

pub async fn update_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateRequest>,
) -> Result<Json<UpdateResponse>, HttpGalleryError> {
    let service = LifecycleService::new(state);
    let record = service
        .update_file(body.password.as_deref(), &key, body.update)
        .await?;

    Ok(Json(UpdateResponse {
        success: true,
        file: record,
    }))
}
