//! Application initialization
//!
//! Wires configuration, database pool, storage backends, and the transcoder
//! into `AppState`, then builds the router. Kept separate from `main` so
//! failures surface as errors rather than panics.

pub mod routes;
pub mod server;

use anyhow::{Context, Result};
use galleria_core::Config;
use galleria_db::PgMediaStore;
use galleria_processing::FfmpegTranscoder;
use galleria_storage::StorageRouter;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

const DB_MAX_CONNECTIONS: u32 = 10;
const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let pool = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(DB_CONNECT_TIMEOUT_SECS))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let store = PgMediaStore::new(pool);
    store
        .ensure_schema()
        .await
        .context("Failed to ensure database schema")?;

    let storage = StorageRouter::from_config(&config)
        .await
        .context("Failed to initialize storage backends")?;

    let transcoder = FfmpegTranscoder::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone())
        .context("Failed to initialize transcoder")?;

    tracing::info!(
        storage_target = %storage.upload_target_type().as_str(),
        "Storage backends initialized"
    );

    let state = Arc::new(AppState::new(
        config,
        Arc::new(store),
        storage,
        Arc::new(transcoder),
    ));

    let router = routes::build_router(state.clone());

    Ok((state, router))
}
