//! Introspection endpoints

use axum::{extract::State, Json};
use galleria_core::StorageType;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage_type: StorageType,
    pub version: &'static str,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage_type: state.storage.upload_target_type(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn test() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Galleria API is reachable"
    }))
}
