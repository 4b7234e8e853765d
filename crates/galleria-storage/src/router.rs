//! Storage routing
//!
//! The local backend always exists; the remote backend exists only when the
//! configuration carries a complete credential set. Uploads target remote
//! when available, local otherwise; deletion and migration address whichever
//! backend a record's storage type names.

use crate::local::LocalStorage;
use crate::remote::RemoteStorage;
use crate::traits::{Storage, StorageError, StorageResult};
use galleria_core::{Config, StorageType};
use std::sync::Arc;

#[derive(Clone)]
pub struct StorageRouter {
    local: Arc<dyn Storage>,
    remote: Option<Arc<dyn Storage>>,
}

impl StorageRouter {
    pub fn new(local: Arc<dyn Storage>, remote: Option<Arc<dyn Storage>>) -> Self {
        Self { local, remote }
    }

    /// Build both backends from configuration resolved at startup.
    pub async fn from_config(config: &Config) -> StorageResult<Self> {
        let local = LocalStorage::new(
            config.upload_dir.clone(),
            config.local_base_url.clone(),
        )
        .await?;

        let remote = if config.remote_storage_configured() {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let access_key_id = config.s3_access_key_id.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_ACCESS_KEY_ID not configured".to_string())
            })?;
            let secret_access_key = config.s3_secret_access_key.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_SECRET_ACCESS_KEY not configured".to_string())
            })?;

            let storage = RemoteStorage::new(
                bucket,
                config.s3_region.clone(),
                config.s3_endpoint.clone(),
                access_key_id,
                secret_access_key,
                config.s3_tenant_id.clone(),
            )
            .await?;
            Some(Arc::new(storage) as Arc<dyn Storage>)
        } else {
            None
        };

        Ok(Self {
            local: Arc::new(local),
            remote,
        })
    }

    /// Backend new uploads go to: remote if configured, else local.
    pub fn upload_target(&self) -> &Arc<dyn Storage> {
        self.remote.as_ref().unwrap_or(&self.local)
    }

    pub fn upload_target_type(&self) -> StorageType {
        self.upload_target().storage_type()
    }

    /// Backend holding artifacts of the given storage type.
    pub fn for_type(&self, storage_type: StorageType) -> StorageResult<&Arc<dyn Storage>> {
        match storage_type {
            StorageType::Local => Ok(&self.local),
            StorageType::Remote => self.remote.as_ref().ok_or_else(|| {
                StorageError::ConfigError(
                    "Record lives in remote storage but remote storage is not configured"
                        .to_string(),
                )
            }),
        }
    }

    pub fn local(&self) -> &Arc<dyn Storage> {
        &self.local
    }

    /// Remote backend, required (migration tool).
    pub fn remote(&self) -> StorageResult<&Arc<dyn Storage>> {
        self.for_type(StorageType::Remote)
    }
}
