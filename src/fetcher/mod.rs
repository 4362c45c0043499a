//! Resolving a source URL to a progressive stream and downloading it.

pub mod client;
pub mod models;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub use client::YtDlpFetcher;
pub use models::FetcherConfig;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("yt-dlp not found at path: {path}")]
    YtDlpNotFound { path: PathBuf },

    #[error("Failed to resolve video: {reason}")]
    ResolveFailed { reason: String, stderr: String },

    #[error("Invalid video metadata: {0}")]
    InvalidMetadata(String),

    #[error("Resolving the video timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// A media file written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub title: String,
    pub path: PathBuf,
}

/// Result of a fetch that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded(FetchedMedia),
    /// The source resolved but offers no compatible progressive stream.
    NoStream { title: String },
}

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Downloads the best progressive stream for `url` into `output_dir`.
    async fn fetch(&self, url: &str, output_dir: &Path) -> Result<FetchOutcome>;
}
