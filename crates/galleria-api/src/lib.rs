//! Galleria API library
//!
//! HTTP surface for the gallery: upload, listing, update, deletion, and
//! health endpoints, plus the pipeline services behind them. Exposed as a
//! library so the integration tests can assemble the router against test
//! doubles.

pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
