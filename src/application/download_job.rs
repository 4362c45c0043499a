use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::{
    domain::{DownloadRequest, DownloadResult, FormatOutcome, JobStatus},
    fetcher::{FetchOutcome, MediaFetcher},
    transcoder::MediaTranscoder,
    utils::file_stem,
};

/// Runs one fetch-then-convert workflow per request.
#[derive(Clone)]
pub struct DownloadJob {
    fetcher: Arc<dyn MediaFetcher>,
    transcoder: Arc<dyn MediaTranscoder>,
}

impl DownloadJob {
    pub fn new(fetcher: Arc<dyn MediaFetcher>, transcoder: Arc<dyn MediaTranscoder>) -> Self {
        Self {
            fetcher,
            transcoder,
        }
    }

    /// Downloads the video, then extracts one audio file per requested format.
    ///
    /// Never fails: every error ends up in the returned [`DownloadResult`].
    pub async fn run(&self, request: &DownloadRequest) -> DownloadResult {
        let output_dir = request.output_directory();
        info!(
            "Requesting video: {} as {} in {}",
            request.source_url(),
            request.formats_label(),
            output_dir.display()
        );

        if let Err(reason) = ensure_writable_dir(output_dir).await {
            error!("Output folder {} is unusable: {}", output_dir.display(), reason);
            return DownloadResult::not_downloaded(JobStatus::OutputUnavailable(reason));
        }

        let media = match self.fetcher.fetch(request.source_url(), output_dir).await {
            Ok(FetchOutcome::Downloaded(media)) => media,
            Ok(FetchOutcome::NoStream { title }) => {
                error!("No suitable video stream found for: {}", title);
                return DownloadResult::not_downloaded(JobStatus::NoStreamAvailable);
            }
            Err(e) => {
                error!("Error downloading the video: {}", e);
                return DownloadResult::not_downloaded(JobStatus::FetchFailed(e.to_string()));
            }
        };
        info!("Video successfully downloaded as {}", media.path.display());

        let stem = file_stem(&media.title);
        let mut per_format_outcome = BTreeMap::new();
        for &format in request.requested_formats() {
            let audio_path = output_dir.join(format!("{}.{}", stem, format.extension()));
            let outcome = match self
                .transcoder
                .extract_audio(&media.path, &audio_path, format)
                .await
            {
                Ok(()) => {
                    info!("Video successfully converted as {}", audio_path.display());
                    FormatOutcome::Converted(audio_path)
                }
                Err(e) => {
                    error!("Error converting to {}: {}", format, e);
                    FormatOutcome::Failed(e.to_string())
                }
            };
            per_format_outcome.insert(format, outcome);
        }

        DownloadResult {
            status: JobStatus::Completed,
            downloaded_media_path: Some(media.path),
            per_format_outcome,
        }
    }
}

async fn ensure_writable_dir(dir: &Path) -> Result<(), String> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| e.to_string())?;
    let metadata = tokio::fs::metadata(dir).await.map_err(|e| e.to_string())?;
    if !metadata.is_dir() {
        return Err("not a directory".to_string());
    }
    if metadata.permissions().readonly() {
        return Err("directory is read-only".to_string());
    }
    Ok(())
}
