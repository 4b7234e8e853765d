use galleria_core::{Config, MediaKind};
use std::path::Path;

/// Common validation errors for uploaded files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

struct AllowList {
    extensions: Vec<String>,
    content_types: Vec<String>,
}

/// Upload validator
///
/// Classifies a file as image or video from its extension, then requires the
/// client-supplied content type to be on the same kind's allow-list.
/// Extension and content type must BOTH pass: the content type is spoofable
/// and the extension alone does not confirm content.
pub struct UploadValidator {
    max_file_size: usize,
    image: AllowList,
    video: AllowList,
}

impl UploadValidator {
    pub fn new(
        max_file_size: usize,
        image_extensions: Vec<String>,
        image_content_types: Vec<String>,
        video_extensions: Vec<String>,
        video_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            image: AllowList {
                extensions: image_extensions,
                content_types: image_content_types,
            },
            video: AllowList {
                extensions: video_extensions,
                content_types: video_content_types,
            },
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_upload_size_bytes,
            config.image_allowed_extensions.clone(),
            config.image_allowed_content_types.clone(),
            config.video_allowed_extensions.clone(),
            config.video_allowed_content_types.clone(),
        )
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate extension and content type, returning the media kind.
    pub fn validate_kind(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<MediaKind, ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        let (kind, list) = if self.image.extensions.contains(&extension) {
            (MediaKind::Image, &self.image)
        } else if self.video.extensions.contains(&extension) {
            (MediaKind::Video, &self.video)
        } else {
            let mut allowed = self.image.extensions.clone();
            allowed.extend(self.video.extensions.iter().cloned());
            return Err(ValidationError::InvalidExtension { extension, allowed });
        };

        let normalized = content_type.to_lowercase();
        if !list.content_types.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: list.content_types.clone(),
            });
        }

        Ok(kind)
    }

    /// Validate all aspects of a file before anything touches storage.
    pub fn validate(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<MediaKind, ValidationError> {
        self.validate_file_size(file_size)?;
        self.validate_kind(filename, content_type)
    }
}
