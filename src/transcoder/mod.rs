//! Extracting the audio track of a downloaded video.

pub mod ffmpeg;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AudioFormat;

pub use ffmpeg::FfmpegTranscoder;

/// Errors that can occur while extracting audio.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Conversion failed: {reason}")]
    ConversionFailed { reason: String, stderr: String },

    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub const FFMPEG_PATH_ENV: &str = "VIDEO_DL_FFMPEG";

#[derive(Debug, Clone)]
pub struct TranscoderConfig {
    pub ffmpeg_path: PathBuf,
    pub sample_rate_hz: u32,
    /// Only applied to lossy formats. `None` keeps the encoder default.
    pub mp3_bitrate_kbps: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: std::env::var(FFMPEG_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ffmpeg")),
            sample_rate_hz: 44100,
            mp3_bitrate_kbps: None,
            timeout_secs: 600,
        }
    }
}

#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    /// Writes the audio track of `input` to `output` encoded as `format`.
    async fn extract_audio(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
    ) -> Result<(), TranscodeError>;
}
