use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::{MediaTranscoder, TranscodeError, TranscoderConfig};
use crate::domain::AudioFormat;

fn codec(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Mp3 => "libmp3lame",
        AudioFormat::Wav => "pcm_s16le",
    }
}

/// Audio extraction through the `ffmpeg` binary.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    fn build_args(&self, input: &Path, output: &Path, format: AudioFormat) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-c:a".to_string(),
            codec(format).to_string(),
            "-ar".to_string(),
            self.config.sample_rate_hz.to_string(),
        ];

        if !format.is_lossless() {
            if let Some(bitrate) = self.config.mp3_bitrate_kbps {
                args.extend(["-b:a".to_string(), format!("{}k", bitrate)]);
            }
        }

        args.extend(["-loglevel".to_string(), "error".to_string()]);
        args.push(output.to_string_lossy().to_string());
        args
    }
}

#[async_trait]
impl MediaTranscoder for FfmpegTranscoder {
    async fn extract_audio(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
    ) -> Result<(), TranscodeError> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(TranscodeError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        let start = Instant::now();
        let child = Command::new(&self.config.ffmpeg_path)
            .args(self.build_args(input, output, format))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    TranscodeError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        let timeout_secs = self.config.timeout_secs;
        let result = timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
            .await
            .map_err(|_| TranscodeError::Timeout { timeout_secs })??;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            let reason = stderr
                .lines()
                .last()
                .map(str::to_string)
                .unwrap_or_else(|| format!("ffmpeg exited with {}", result.status));
            return Err(TranscodeError::ConversionFailed { reason, stderr });
        }

        debug!(
            "Extracted {} audio to {} in {:?}",
            format,
            output.display(),
            start.elapsed()
        );
        Ok(())
    }
}
