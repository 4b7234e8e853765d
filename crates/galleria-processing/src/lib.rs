//! Galleria processing library
//!
//! Upload validation (extension/content-type/size allow-lists), in-process
//! image dimension probing, and video artifact derivation behind a narrow
//! `Transcoder` capability trait so the upload pipeline has no dependency on
//! a specific external tool.

pub mod image_probe;
pub mod transcode;
pub mod validator;

pub use image_probe::image_dimensions;
pub use transcode::{FfmpegTranscoder, TranscodeError, Transcoder};
pub use validator::{UploadValidator, ValidationError};
