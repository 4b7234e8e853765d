//! Domain models
//!
//! `MediaRecord` is the single persisted record type, keyed by the generated
//! storage filename. Storage fields (`url`, `thumbnail`, `storage_type`) are
//! only ever written by the upload pipeline and the migration tool; the
//! update surface mutates descriptive fields exclusively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Where a record's artifacts live. Determines how `url`/`thumbnail` are
/// interpreted and which backend deletion must address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Local,
    Remote,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Local => "local",
            StorageType::Remote => "remote",
        }
    }

    /// Records written before storage tagging existed have no storage_type;
    /// they are treated as local for backward compatibility.
    pub fn parse_or_local(value: Option<&str>) -> StorageType {
        match value {
            Some("remote") => StorageType::Remote,
            _ => StorageType::Local,
        }
    }
}

/// Media kind, derived from the validated content type at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Pixel dimensions of the primary artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// One record per uploaded asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Generated storage key (`{uuid}.{ext}`), unique, the only lookup key.
    pub filename: String,
    /// User-supplied name of the uploaded file, kept for display only.
    pub original_filename: String,
    /// Display name shown in the gallery; defaults to the original filename.
    pub name: String,
    pub url: String,
    pub thumbnail: Option<String>,
    pub storage_type: StorageType,
    pub kind: MediaKind,
    pub content_type: String,
    pub file_size: i64,
    pub dimensions: Option<Dimensions>,
    /// Capture/display date as supplied by the client.
    pub date: Option<String>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub photographer: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Descriptive metadata supplied with an upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub tags: Option<Vec<String>>,
    pub photographer: Option<String>,
}

/// Upload metadata is either one object applied to every file in the batch or
/// an array applied positionally. Resolved to one concrete value per file
/// before the pipeline runs; ambiguous shapes are rejected here, not guessed
/// at later.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UploadMetadata {
    PerFile(Vec<FileMetadata>),
    Shared(FileMetadata),
}

impl UploadMetadata {
    pub fn resolve(self, file_count: usize) -> Result<Vec<FileMetadata>, AppError> {
        match self {
            UploadMetadata::Shared(meta) => Ok(vec![meta; file_count]),
            UploadMetadata::PerFile(list) => {
                if list.len() != file_count {
                    return Err(AppError::InvalidInput(format!(
                        "Metadata array has {} entries but {} files were uploaded",
                        list.len(),
                        file_count
                    )));
                }
                Ok(list)
            }
        }
    }
}

/// Fields the update surface may mutate. Storage fields are deliberately
/// absent from this struct.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordUpdate {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub tags: Option<Vec<String>>,
    pub photographer: Option<String>,
}

impl RecordUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.tags.is_none()
            && self.photographer.is_none()
    }

    /// Apply to a record in place, leaving storage fields untouched.
    pub fn apply(&self, record: &mut MediaRecord) {
        if let Some(ref name) = self.name {
            record.name = name.clone();
        }
        if let Some(ref date) = self.date {
            record.date = Some(date.clone());
        }
        if let Some(ref location) = self.location {
            record.location = Some(location.clone());
        }
        if let Some(ref tags) = self.tags {
            record.tags = tags.clone();
        }
        if let Some(ref photographer) = self.photographer {
            record.photographer = Some(photographer.clone());
        }
    }
}
