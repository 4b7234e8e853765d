//! Video artifact derivation
//!
//! A narrow capability trait over the external transcoding tool: extract one
//! still frame and probe pixel dimensions. The pipeline core never invokes
//! ffmpeg directly, so a test double can substitute deterministic fixtures.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use galleria_core::Dimensions;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Seconds into the video to grab the still frame; skips black leaders.
const FRAME_OFFSET_SECS: f64 = 3.0;

/// Thumbnail width in pixels; height follows the source aspect ratio.
const THUMBNAIL_WIDTH: u32 = 480;

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: &'static str, message: String },

    #[error("Source not decodable: {0}")]
    Undecodable(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability interface for deriving secondary video artifacts.
///
/// Failures here must never abort an upload; callers suppress the derived
/// fields instead.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Extract one JPEG frame at a fixed offset, scaled to a fixed width with
    /// preserved aspect ratio.
    async fn extract_frame(&self, source: &Path) -> Result<Vec<u8>, TranscodeError>;

    /// Probe the source's pixel dimensions.
    async fn probe_dimensions(&self, source: &Path) -> Result<Dimensions, TranscodeError>;
}

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
fn validate_path(path: &str) -> Result<(), TranscodeError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(TranscodeError::InvalidPath(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(TranscodeError::InvalidPath(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

fn validated(source: &Path) -> Result<PathBuf, TranscodeError> {
    validate_path(&source.to_string_lossy())?;
    Ok(source.to_path_buf())
}

/// FFmpeg/ffprobe-backed transcoder.
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: String, ffprobe_path: String) -> Result<Self> {
        validate_path(&ffmpeg_path)
            .map_err(|e| anyhow!(e))
            .context("Invalid ffmpeg_path")?;
        validate_path(&ffprobe_path)
            .map_err(|e| anyhow!(e))
            .context("Invalid ffprobe_path")?;

        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
        })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "extract_frame"
    ))]
    async fn extract_frame(&self, source: &Path) -> Result<Vec<u8>, TranscodeError> {
        let source = validated(source)?;
        let start = std::time::Instant::now();

        let offset = FRAME_OFFSET_SECS.to_string();
        let scale = format!("scale={}:-2", THUMBNAIL_WIDTH);

        let output = Command::new(&self.ffmpeg_path)
            .args(["-loglevel", "error", "-ss", offset.as_str(), "-i"])
            .arg(&source)
            .args([
                "-frames:v",
                "1",
                "-vf",
                scale.as_str(),
                "-f",
                "image2pipe",
                "-vcodec",
                "mjpeg",
                "pipe:1",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(TranscodeError::ToolFailed {
                tool: "ffmpeg",
                message: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        if output.stdout.is_empty() {
            return Err(TranscodeError::Undecodable(
                "ffmpeg produced no frame data".to_string(),
            ));
        }

        tracing::info!(
            source = %source.display(),
            size_bytes = output.stdout.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail frame extracted"
        );

        Ok(output.stdout)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe_dimensions(&self, source: &Path) -> Result<Dimensions, TranscodeError> {
        let source = validated(source)?;
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(&source)
            .output()
            .await?;

        if !output.status.success() {
            return Err(TranscodeError::ToolFailed {
                tool: "ffprobe",
                message: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let probe_data: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| TranscodeError::Undecodable(format!("ffprobe output: {}", e)))?;

        let stream = probe_data["streams"]
            .get(0)
            .ok_or_else(|| TranscodeError::Undecodable("No video stream found".to_string()))?;

        let width = stream["width"]
            .as_u64()
            .ok_or_else(|| TranscodeError::Undecodable("Could not parse width".to_string()))?
            as u32;

        let height = stream["height"]
            .as_u64()
            .ok_or_else(|| TranscodeError::Undecodable("Could not parse height".to_string()))?
            as u32;

        tracing::info!(
            source = %source.display(),
            width = width,
            height = height,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video probe completed"
        );

        Ok(Dimensions { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_rejects_shell_metacharacters() {
        assert!(validate_path("/usr/bin/ffmpeg").is_ok());
        assert!(validate_path("video; rm -rf /").is_err());
        assert!(validate_path("clip$(whoami).mp4").is_err());
        assert!(validate_path("../../etc/passwd").is_err());
    }

    #[test]
    fn test_new_rejects_dangerous_tool_paths() {
        assert!(FfmpegTranscoder::new("ffmpeg".to_string(), "ffprobe".to_string()).is_ok());
        assert!(FfmpegTranscoder::new("ffmpeg|sh".to_string(), "ffprobe".to_string()).is_err());
    }
}
