mod app;
mod application;
mod config;
mod domain;
mod fetcher;
#[cfg(all(test, unix))]
mod testing;
mod transcoder;
mod ui;
mod utils;

use std::sync::Arc;

use iced::{window, Size};
use tracing::info;

use application::DownloadJob;
use config::SettingsStore;
use fetcher::{FetcherConfig, YtDlpFetcher};
use transcoder::{FfmpegTranscoder, TranscoderConfig};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "simple_video_downloader=info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> iced::Result {
    init_tracing();

    let settings = SettingsStore::load(config::config_path());
    info!(
        "Loaded settings from {} (theme: {:?}, color theme: {})",
        settings.path().display(),
        settings.settings().theme,
        settings.settings().color_theme
    );

    let job = DownloadJob::new(
        Arc::new(YtDlpFetcher::new(FetcherConfig::default())),
        Arc::new(FfmpegTranscoder::new(TranscoderConfig::default())),
    );

    iced::application(
        move || app::DownloadApp::new(settings.clone(), job.clone()),
        app::update,
        app::view,
    )
    .title("Simple YouTube Downloader")
    .theme(app::theme)
    .window(window::Settings {
        size: Size::new(500.0, 400.0),
        ..Default::default()
    })
    .run()
}
