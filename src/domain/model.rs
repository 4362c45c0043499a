use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::AppError;

/// Audio formats a downloaded video can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 2] = [AudioFormat::Mp3, AudioFormat::Wav];

    /// File extension, also used as the user-facing name.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn is_lossless(&self) -> bool {
        matches!(self, AudioFormat::Wav)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "wav" => Ok(AudioFormat::Wav),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A single user submission. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    source_url: String,
    requested_formats: BTreeSet<AudioFormat>,
    output_directory: PathBuf,
}

impl DownloadRequest {
    pub fn new(
        source_url: impl Into<String>,
        requested_formats: impl IntoIterator<Item = AudioFormat>,
        output_directory: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        let source_url = source_url.into().trim().to_string();
        if source_url.is_empty() {
            return Err(AppError::InvalidInput);
        }

        Ok(Self {
            source_url,
            requested_formats: requested_formats.into_iter().collect(),
            output_directory: output_directory.into(),
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn requested_formats(&self) -> &BTreeSet<AudioFormat> {
        &self.requested_formats
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Comma separated format list for log lines, e.g. `[mp3, wav]`.
    pub fn formats_label(&self) -> String {
        let names: Vec<&str> = self
            .requested_formats
            .iter()
            .map(AudioFormat::extension)
            .collect();
        format!("[{}]", names.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    NoStreamAvailable,
    FetchFailed(String),
    OutputUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    Converted(PathBuf),
    Failed(String),
}

impl FormatOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FormatOutcome::Converted(_))
    }
}

/// What one job invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub status: JobStatus,
    pub downloaded_media_path: Option<PathBuf>,
    pub per_format_outcome: BTreeMap<AudioFormat, FormatOutcome>,
}

impl DownloadResult {
    pub fn not_downloaded(status: JobStatus) -> Self {
        Self {
            status,
            downloaded_media_path: None,
            per_format_outcome: BTreeMap::new(),
        }
    }

    /// True when the media was downloaded and every requested format converted.
    pub fn succeeded(&self) -> bool {
        self.status == JobStatus::Completed
            && self.per_format_outcome.values().all(FormatOutcome::is_success)
    }

    /// One line for the status label.
    pub fn summary(&self) -> String {
        match &self.status {
            JobStatus::NoStreamAvailable => "No suitable video stream found.".to_string(),
            JobStatus::FetchFailed(reason) => format!("Download failed: {}", reason),
            JobStatus::OutputUnavailable(reason) => {
                format!("Output folder unavailable: {}", reason)
            }
            JobStatus::Completed => {
                let mut line = match &self.downloaded_media_path {
                    Some(path) => format!("Saved: {}", path.display()),
                    None => "Saved".to_string(),
                };
                let failed: Vec<&str> = self
                    .per_format_outcome
                    .iter()
                    .filter(|(_, outcome)| !outcome.is_success())
                    .map(|(format, _)| format.extension())
                    .collect();
                let converted = self.per_format_outcome.len() - failed.len();
                if converted > 0 {
                    line.push_str(&format!(" ({} audio file(s) written)", converted));
                }
                if !failed.is_empty() {
                    line.push_str(&format!(", conversion failed for: {}", failed.join(", ")));
                }
                line
            }
        }
    }
}
