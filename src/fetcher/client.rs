use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;

use async_trait::async_trait;
use futures::{Stream, StreamExt, TryStreamExt};
use regex::Regex;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::models::{select_progressive, FetcherConfig, StreamFormat, VideoInfo};
use super::{FetchError, FetchOutcome, FetchedMedia, MediaFetcher, Result};
use crate::utils::file_stem;

/// Resolves streams with yt-dlp and downloads the chosen one over HTTP.
#[derive(Clone)]
pub struct YtDlpFetcher {
    config: FetcherConfig,
    http: Client,
}

impl YtDlpFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Step 1: ask yt-dlp for the video metadata and its format list
    pub async fn resolve(&self, url: &str) -> Result<VideoInfo> {
        let child = Command::new(&self.config.ytdlp_path)
            .args([
                "--dump-single-json",
                "--no-playlist",
                "--no-warnings",
                "--skip-download",
                "--",
            ])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    FetchError::YtDlpNotFound {
                        path: self.config.ytdlp_path.clone(),
                    }
                } else {
                    FetchError::Io(e)
                }
            })?;

        let timeout_secs = self.config.resolve_timeout_secs;
        let output = timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
            .await
            .map_err(|_| FetchError::Timeout { timeout_secs })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(FetchError::ResolveFailed {
                reason: ytdlp_error_message(&stderr)
                    .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status)),
                stderr,
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| FetchError::InvalidMetadata(format!("JSON decode error: {}", e)))
    }

    /// Step 2: open the stream for a selected format
    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        download_url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let mut request = self.http.get(download_url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?.error_for_status()?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(FetchError::Request);

        Ok((total_size, stream))
    }

    /// Step 3: write the stream to `<dir>/<title>.<ext>`
    ///
    /// Data lands in a `.part` file that is renamed once complete and removed
    /// on failure.
    pub async fn download_to(
        &self,
        format: &StreamFormat,
        output_dir: &Path,
        title: &str,
    ) -> Result<PathBuf> {
        let url = format
            .url
            .as_deref()
            .ok_or_else(|| FetchError::InvalidMetadata("selected stream has no URL".to_string()))?;

        let file_name = format!("{}.{}", file_stem(title), format.ext);
        let final_path = output_dir.join(&file_name);
        let part_path = output_dir.join(format!("{}.part", file_name));

        let written = match self.write_stream(url, format, &part_path).await {
            Ok(written) => tokio::fs::rename(&part_path, &final_path)
                .await
                .map(|()| written)
                .map_err(FetchError::from),
            Err(e) => Err(e),
        };

        match written {
            Ok(written) => {
                debug!("Wrote {} bytes to {}", written, final_path.display());
                Ok(final_path)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part_path).await;
                Err(e)
            }
        }
    }

    async fn write_stream(&self, url: &str, format: &StreamFormat, path: &Path) -> Result<u64> {
        let mut file = tokio::fs::File::create(path).await?;
        let (total_size, stream) = self.download_file_stream(url, &format.http_headers).await?;
        let total = total_size.or(format.filesize);
        let mut stream = Box::pin(stream);

        let mut downloaded: u64 = 0;
        let mut next_report = 10;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(total) = total.filter(|t| *t > 0) {
                let percent = downloaded * 100 / total;
                if percent >= next_report {
                    debug!("Downloading: {}%", percent.min(100));
                    next_report = (percent / 10 + 1) * 10;
                }
            }
        }

        file.sync_all().await?;
        Ok(downloaded)
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, output_dir: &Path) -> Result<FetchOutcome> {
        let info = self.resolve(url).await?;
        info!(
            "Resolved video: {} [{}] ({} formats)",
            info.title,
            info.id,
            info.formats.len()
        );

        let Some(stream) = select_progressive(&info.formats, &self.config.container) else {
            return Ok(FetchOutcome::NoStream { title: info.title });
        };
        debug!(
            "Selected format {} ({}p, {})",
            stream.format_id,
            stream.height.unwrap_or(0),
            stream.ext
        );

        let path = self.download_to(stream, output_dir, &info.title).await?;
        Ok(FetchOutcome::Downloaded(FetchedMedia {
            title: info.title,
            path,
        }))
    }
}

static YTDLP_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ERROR:\s*(?:\[[^\]]+\]\s*)?(?:[\w-]+:\s)?(.+)$")
        .expect("yt-dlp error pattern is valid")
});

/// Pulls the human readable part out of yt-dlp's last `ERROR:` line.
fn ytdlp_error_message(stderr: &str) -> Option<String> {
    YTDLP_ERROR
        .captures_iter(stderr)
        .last()
        .map(|caps| caps[1].trim().to_string())
}
