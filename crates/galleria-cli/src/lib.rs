//! Galleria operator CLI library
//!
//! Hosts the storage migration logic so it can be exercised directly by
//! tests; the binary in `main.rs` is a thin clap wrapper around it.

pub mod migrate;

pub use migrate::{MigrationOptions, MigrationReport, Migrator};
