//! Application state
//!
//! All pipeline dependencies are injected here once at startup: storage
//! routing resolved from configuration, the metadata store, and the
//! transcoder capability. Handlers and services receive `Arc<AppState>` and
//! never read ambient global state, which is what lets the integration tests
//! substitute doubles.

use galleria_core::Config;
use galleria_db::MediaStore;
use galleria_processing::{Transcoder, UploadValidator};
use galleria_storage::StorageRouter;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn MediaStore>,
    pub storage: StorageRouter,
    pub transcoder: Arc<dyn Transcoder>,
    pub validator: UploadValidator,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn MediaStore>,
        storage: StorageRouter,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let validator = UploadValidator::from_config(&config);
        Self {
            config,
            store,
            storage,
            transcoder,
            validator,
        }
    }
}
