//! Storage key generation
//!
//! Keys are generated, never user-supplied: a fresh random identifier plus
//! the original extension. This prevents collisions and path traversal by
//! construction.

use std::path::Path;
use uuid::Uuid;

/// Fixed extension for derived video thumbnails.
pub const THUMBNAIL_EXT: &str = "jpg";

/// Subdirectory (key prefix) for derived thumbnails.
pub const THUMBNAIL_PREFIX: &str = "thumbnails";

/// Generate a fresh storage key preserving the original file's extension.
///
/// `holiday.MP4` becomes e.g. `3f2a61e4-....mp4`; a file with no extension
/// gets a bare UUID key.
pub fn generate_key(original_filename: &str) -> String {
    let id = Uuid::new_v4();
    match Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(ext) => format!("{}.{}", id, ext.to_lowercase()),
        None => id.to_string(),
    }
}

/// Thumbnail key for a primary key: same base name under `thumbnails/`, with
/// the fixed image extension.
pub fn thumbnail_key(primary_key: &str) -> String {
    let stem = Path::new(primary_key)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(primary_key);
    format!("{}/{}.{}", THUMBNAIL_PREFIX, stem, THUMBNAIL_EXT)
}
