//! Download YouTube videos through yt-dlp, falling back to pytube when the
//! preferred tool fails.

pub mod batch;
pub mod config;
pub mod downloader;
pub mod logging;
pub mod url;

use std::path::Path;

pub use batch::{BatchRunner, BatchSummary};
pub use config::{BatchConfig, ConfigError};
pub use downloader::{
    BackendOptions, DownloadError, DownloadOutcome, DownloadRequest, Downloader, DownloaderBackend, Method,
};
pub use crate::url::normalize;

/// Download a single video with the built-in backends.
///
/// yt-dlp is tried first unless `prefer_secondary` is set. Returns whether
/// either method produced the video.
pub async fn download_youtube_video(url: &str, output_path: impl AsRef<Path>, prefer_secondary: bool) -> bool {
    let downloader = Downloader::with_default_backends(&BackendOptions::default());
    let request = DownloadRequest::new(
        url,
        output_path.as_ref(),
        Method::from_preference(prefer_secondary),
    );
    downloader.download(&request).await.succeeded
}

/// Run a whole batch as described by `config`
pub async fn run_batch(config: &BatchConfig) -> BatchSummary {
    let downloader = Downloader::with_default_backends(&config.backend_options());
    BatchRunner::new(downloader)
        .run(&config.urls, &config.output_dir, config.preferred)
        .await
}
