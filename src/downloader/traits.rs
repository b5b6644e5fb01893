// Download capability trait definition

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::{DownloadProgress, Method, VideoInfo};

/// Trait for download capability implementations
#[async_trait]
pub trait DownloaderBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Method this backend implements
    fn method(&self) -> Method;

    /// Get video information from URL
    async fn get_video_info(&self, url: &str) -> Result<VideoInfo, DownloadError>;

    /// Download into `output_dir`, returning the media file when the tool reports it
    async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        emitter: &ProgressEmitter,
    ) -> Result<Option<PathBuf>, DownloadError>;

    /// Title discovery followed by the download.
    ///
    /// A failed title lookup is only reported; the download still runs.
    async fn attempt(
        &self,
        url: &str,
        output_dir: &Path,
        emitter: &ProgressEmitter,
    ) -> Result<Option<PathBuf>, DownloadError> {
        match self.get_video_info(url).await {
            Ok(info) => emitter.emit(DownloadProgress::status(format!(
                "{}: found \"{}\" by {} ({})",
                self.name(),
                info.title,
                info.uploader,
                info.duration
            ))),
            Err(e) => {
                tracing::debug!(backend = self.name(), error = %e, "title lookup failed");
                emitter.emit(DownloadProgress::status(format!(
                    "{}: could not read video title, downloading anyway",
                    self.name()
                )));
            }
        }

        self.download(url, output_dir, emitter).await
    }
}

/// Destination for human-readable progress lines
pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: DownloadProgress);
}

/// Prints progress lines to stdout
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn emit(&self, progress: DownloadProgress) {
        if progress.percent > 0.0 && progress.percent < 100.0 {
            println!("  [{:5.1}%] {}", progress.percent, progress.status);
        } else {
            println!("{}", progress.status);
        }
    }
}

/// Discards everything
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn emit(&self, _progress: DownloadProgress) {}
}

/// Progress emitter helper
#[derive(Clone)]
pub struct ProgressEmitter {
    sink: Arc<dyn ProgressSink>,
}

impl ProgressEmitter {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink }
    }

    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleProgress))
    }

    pub fn silent() -> Self {
        Self::new(Arc::new(SilentProgress))
    }

    pub fn emit(&self, progress: DownloadProgress) {
        self.sink.emit(progress);
    }

    pub fn status(&self, status: impl Into<String>) {
        self.emit(DownloadProgress::status(status));
    }
}

impl Default for ProgressEmitter {
    fn default() -> Self {
        Self::console()
    }
}
