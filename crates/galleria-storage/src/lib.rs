//! Galleria storage library
//!
//! Storage abstraction and backends for the gallery: a local-filesystem
//! backend rooted at the uploads directory and an S3-compatible remote
//! backend. The `StorageRouter` holds both and picks the upload target from
//! configuration resolved at startup.
//!
//! # Storage key format
//!
//! Primary artifacts live at `{uuid}.{ext}`; derived video thumbnails live at
//! `thumbnails/{uuid}.jpg` with the same base key. Keys must not contain `..`
//! or a leading `/`. Key generation is centralized in the `keys` module so
//! backends and pipelines stay consistent.

pub mod keys;
pub mod local;
pub mod remote;
pub mod router;
pub mod traits;

pub use keys::{generate_key, thumbnail_key};
pub use local::LocalStorage;
pub use remote::RemoteStorage;
pub use router::StorageRouter;
pub use traits::{Storage, StorageError, StorageResult};
