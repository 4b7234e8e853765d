//! Postgres metadata store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use galleria_core::{
    AppError, Dimensions, MediaKind, MediaRecord, RecordUpdate, StorageType,
};
use sqlx::{FromRow, PgPool};

use crate::store::MediaStore;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS media_records (
    filename TEXT PRIMARY KEY,
    original_filename TEXT NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    thumbnail TEXT,
    storage_type TEXT,
    kind TEXT NOT NULL,
    content_type TEXT NOT NULL,
    file_size BIGINT NOT NULL,
    width INTEGER,
    height INTEGER,
    date TEXT,
    location TEXT,
    tags TEXT[] NOT NULL DEFAULT '{}',
    photographer TEXT,
    uploaded_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_media_records_uploaded_at
    ON media_records (uploaded_at DESC);
"#;

const RECORD_COLUMNS: &str = "filename, original_filename, name, url, thumbnail, storage_type, \
kind, content_type, file_size, width, height, date, location, tags, photographer, uploaded_at";

/// Database row for the media_records table.
#[derive(Debug, FromRow)]
struct MediaRecordRow {
    filename: String,
    original_filename: String,
    name: String,
    url: String,
    thumbnail: Option<String>,
    // Nullable: records predating storage tagging are treated as local.
    storage_type: Option<String>,
    kind: String,
    content_type: String,
    file_size: i64,
    width: Option<i32>,
    height: Option<i32>,
    date: Option<String>,
    location: Option<String>,
    tags: Vec<String>,
    photographer: Option<String>,
    uploaded_at: DateTime<Utc>,
}

impl MediaRecordRow {
    fn into_record(self) -> MediaRecord {
        let dimensions = match (self.width, self.height) {
            (Some(w), Some(h)) if w >= 0 && h >= 0 => Some(Dimensions {
                width: w as u32,
                height: h as u32,
            }),
            _ => None,
        };

        MediaRecord {
            filename: self.filename,
            original_filename: self.original_filename,
            name: self.name,
            url: self.url,
            thumbnail: self.thumbnail,
            storage_type: StorageType::parse_or_local(self.storage_type.as_deref()),
            kind: match self.kind.as_str() {
                "video" => MediaKind::Video,
                _ => MediaKind::Image,
            },
            content_type: self.content_type,
            file_size: self.file_size,
            dimensions,
            date: self.date,
            location: self.location,
            tags: self.tags,
            photographer: self.photographer,
            uploaded_at: self.uploaded_at,
        }
    }
}

/// Postgres-backed metadata store
#[derive(Clone)]
pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the records table if it does not exist. Idempotent; run once at
    /// startup.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::debug!("Media records schema ensured");
        Ok(())
    }
}

#[async_trait]
impl MediaStore for PgMediaStore {
    async fn insert(&self, record: &MediaRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO media_records (
                filename, original_filename, name, url, thumbnail, storage_type,
                kind, content_type, file_size, width, height, date, location,
                tags, photographer, uploaded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(&record.filename)
        .bind(&record.original_filename)
        .bind(&record.name)
        .bind(&record.url)
        .bind(&record.thumbnail)
        .bind(record.storage_type.as_str())
        .bind(record.kind.as_str())
        .bind(&record.content_type)
        .bind(record.file_size)
        .bind(record.dimensions.map(|d| d.width as i32))
        .bind(record.dimensions.map(|d| d.height as i32))
        .bind(&record.date)
        .bind(&record.location)
        .bind(&record.tags)
        .bind(&record.photographer)
        .bind(record.uploaded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, filename: &str) -> Result<Option<MediaRecord>, AppError> {
        let row = sqlx::query_as::<_, MediaRecordRow>(&format!(
            "SELECT {} FROM media_records WHERE filename = $1",
            RECORD_COLUMNS
        ))
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaRecordRow::into_record))
    }

    async fn list(&self) -> Result<Vec<MediaRecord>, AppError> {
        let rows = sqlx::query_as::<_, MediaRecordRow>(&format!(
            "SELECT {} FROM media_records ORDER BY uploaded_at DESC",
            RECORD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaRecordRow::into_record).collect())
    }

    async fn update_details(
        &self,
        filename: &str,
        update: &RecordUpdate,
    ) -> Result<Option<MediaRecord>, AppError> {
        let row = sqlx::query_as::<_, MediaRecordRow>(&format!(
            r#"
            UPDATE media_records SET
                name = COALESCE($2, name),
                date = COALESCE($3, date),
                location = COALESCE($4, location),
                tags = COALESCE($5, tags),
                photographer = COALESCE($6, photographer)
            WHERE filename = $1
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(filename)
        .bind(&update.name)
        .bind(&update.date)
        .bind(&update.location)
        .bind(&update.tags)
        .bind(&update.photographer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MediaRecordRow::into_record))
    }

    async fn update_storage(
        &self,
        filename: &str,
        url: &str,
        thumbnail: Option<&str>,
        storage_type: StorageType,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE media_records SET url = $2, thumbnail = $3, storage_type = $4 WHERE filename = $1",
        )
        .bind(filename)
        .bind(url)
        .bind(thumbnail)
        .bind(storage_type.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("File not found: {}", filename)));
        }

        Ok(())
    }

    async fn delete(&self, filename: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media_records WHERE filename = $1")
            .bind(filename)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_local(&self) -> Result<Vec<MediaRecord>, AppError> {
        let rows = sqlx::query_as::<_, MediaRecordRow>(&format!(
            "SELECT {} FROM media_records WHERE storage_type IS NULL OR storage_type = 'local' \
             ORDER BY uploaded_at DESC",
            RECORD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MediaRecordRow::into_record).collect())
    }
}
