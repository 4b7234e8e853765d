use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use galleria_core::StorageType;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::time::Duration;

/// S3-compatible remote storage implementation
///
/// Credentials come from resolved configuration, not ambient environment, so
/// the adapter can be constructed explicitly in tests and in the migration
/// tool.
#[derive(Clone)]
pub struct RemoteStorage {
    store: AmazonS3,
    bucket: String,
    region: Option<String>,
    endpoint_url: Option<String>,
    tenant_id: Option<String>,
}

impl RemoteStorage {
    /// Create a new RemoteStorage instance
    ///
    /// # Arguments
    /// * `bucket` - bucket name
    /// * `region` - region identifier (optional for providers that ignore it)
    /// * `endpoint_url` - custom endpoint for S3-compatible providers
    ///   (e.g., "https://usc1.contabostorage.com", "http://localhost:9000")
    /// * `tenant_id` - provider tenant/account id embedded in public URLs
    pub async fn new(
        bucket: String,
        region: Option<String>,
        endpoint_url: Option<String>,
        access_key_id: String,
        secret_access_key: String,
        tenant_id: Option<String>,
    ) -> StorageResult<Self> {
        // Accept endpoints with or without a scheme; the builder and the
        // public URL format both want a full URL.
        let endpoint_url = endpoint_url.map(|e| {
            let trimmed = e.trim_end_matches('/');
            if trimmed.contains("://") {
                trimmed.to_string()
            } else {
                format!("https://{}", trimmed)
            }
        });

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket.clone())
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_access_key)
            .with_region(region.clone().unwrap_or_else(|| "auto".to_string()));

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(RemoteStorage {
            store,
            bucket,
            region,
            endpoint_url,
            tenant_id,
        })
    }
}

#[async_trait]
impl Storage for RemoteStorage {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<String> {
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Remote storage put failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.public_url(key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote storage put successful"
        );

        Ok(url)
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    "Remote storage download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(_) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Remote storage delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    /// Public URL for a key.
    ///
    /// Providers that embed a tenant/account id ahead of the bucket get
    /// `{endpoint}/{tenant}:{bucket}/{key}`; plain S3-compatible endpoints get
    /// path-style `{endpoint}/{bucket}/{key}`; bare AWS falls back to the
    /// virtual-hosted format.
    fn public_url(&self, key: &str) -> String {
        match self.endpoint_url.as_deref() {
            Some(base) => match &self.tenant_id {
                Some(tenant) => format!("{}/{}:{}/{}", base, tenant, self.bucket, key),
                None => format!("{}/{}/{}", base, self.bucket, key),
            },
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket,
                self.region.as_deref().unwrap_or("us-east-1"),
                key
            ),
        }
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let location = Path::from(key.to_string());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Remote
    }
}
