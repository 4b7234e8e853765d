//! Galleria core library
//!
//! Shared configuration, error taxonomy, domain models, and the shared-secret
//! check used by the API server and the migration CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod secret;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    Dimensions, FileMetadata, MediaKind, MediaRecord, RecordUpdate, StorageType, UploadMetadata,
};
pub use secret::verify_shared_secret;
