//! Galleria database library
//!
//! The metadata store: one record per uploaded asset, keyed by the generated
//! storage filename. The `MediaStore` trait is the seam between the pipelines
//! and Postgres so the migration tool and API tests can run against doubles.

pub mod postgres;
pub mod store;

pub use postgres::PgMediaStore;
pub use store::MediaStore;
