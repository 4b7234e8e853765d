//! Configuration module
//!
//! Env-driven configuration for the gallery server and the migration CLI.
//! Allow-lists are configuration data: the defaults below can be overridden
//! with comma-separated env vars without touching pipeline logic.

use std::env;

/// Application configuration, resolved once at process start and passed
/// explicitly into the pipelines (no ambient global state).
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    /// Shared upload/delete secret. Absence is not fatal at load time; every
    /// authenticated request then fails with a server-misconfigured error.
    pub gallery_password: Option<String>,
    // Remote storage (S3-compatible). All optional; remote operations are
    // disabled unless bucket, access key, and secret key are all present.
    pub s3_endpoint: Option<String>,
    pub s3_region: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
    /// Some providers embed a tenant/account id ahead of the bucket in public
    /// URLs (`https://host/{tenant}:{bucket}/{key}`).
    pub s3_tenant_id: Option<String>,
    // Local storage
    pub upload_dir: String,
    pub local_base_url: String,
    // Upload limits and allow-lists
    pub max_upload_size_bytes: usize,
    pub image_allowed_extensions: Vec<String>,
    pub image_allowed_content_types: Vec<String>,
    pub video_allowed_extensions: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
    // External transcoding tools
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

const MAX_UPLOAD_SIZE_MB: usize = 200;

// Common raster formats plus the RAW extensions cameras actually produce.
// Many RAW formats have no registered MIME type and arrive as x- subtypes or
// application/octet-stream, so the content-type list mirrors that reality.
const IMAGE_EXTENSIONS: &str = "jpg,jpeg,png,gif,webp,bmp,tiff,heic,raw,cr2,nef,arw,dng";
const IMAGE_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp,image/bmp,\
image/tiff,image/heic,image/x-canon-cr2,image/x-nikon-nef,image/x-sony-arw,\
image/x-adobe-dng,application/octet-stream";
const VIDEO_EXTENSIONS: &str = "mp4,mov,avi,webm,mkv,m4v";
const VIDEO_CONTENT_TYPES: &str =
    "video/mp4,video/quicktime,video/x-msvideo,video/webm,video/x-matroska";

fn csv_env(key: &str, default: &str) -> Vec<String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            gallery_password: optional_env("GALLERY_PASSWORD"),
            s3_endpoint: optional_env("S3_ENDPOINT"),
            s3_region: optional_env("S3_REGION").or_else(|| optional_env("AWS_REGION")),
            s3_bucket: optional_env("S3_BUCKET"),
            s3_access_key_id: optional_env("S3_ACCESS_KEY_ID")
                .or_else(|| optional_env("AWS_ACCESS_KEY_ID")),
            s3_secret_access_key: optional_env("S3_SECRET_ACCESS_KEY")
                .or_else(|| optional_env("AWS_SECRET_ACCESS_KEY")),
            s3_tenant_id: optional_env("S3_TENANT_ID"),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            local_base_url: env::var("LOCAL_BASE_URL").unwrap_or_else(|_| "/uploads".to_string()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            image_allowed_extensions: csv_env("IMAGE_ALLOWED_EXTENSIONS", IMAGE_EXTENSIONS),
            image_allowed_content_types: csv_env("IMAGE_ALLOWED_CONTENT_TYPES", IMAGE_CONTENT_TYPES),
            video_allowed_extensions: csv_env("VIDEO_ALLOWED_EXTENSIONS", VIDEO_EXTENSIONS),
            video_allowed_content_types: csv_env("VIDEO_ALLOWED_CONTENT_TYPES", VIDEO_CONTENT_TYPES),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// True iff bucket, access key, and secret key are all present. Region and
    /// endpoint alone are not enough to perform remote operations.
    pub fn remote_storage_configured(&self) -> bool {
        self.s3_bucket.is_some()
            && self.s3_access_key_id.is_some()
            && self.s3_secret_access_key.is_some()
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o.trim() == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        // A partially configured remote store is a deployment mistake we can
        // catch at startup rather than at first upload.
        let any_remote = self.s3_bucket.is_some()
            || self.s3_access_key_id.is_some()
            || self.s3_secret_access_key.is_some();
        if any_remote && !self.remote_storage_configured() {
            return Err(anyhow::anyhow!(
                "Remote storage partially configured: S3_BUCKET, S3_ACCESS_KEY_ID, and S3_SECRET_ACCESS_KEY must all be set together"
            ));
        }
        if self.remote_storage_configured() && self.s3_endpoint.is_none() && self.s3_region.is_none()
        {
            return Err(anyhow::anyhow!(
                "S3_ENDPOINT or S3_REGION must be set when remote storage is configured"
            ));
        }

        Ok(())
    }
}
