use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{format_duration, DownloadProgress, Method, VideoInfo};
use crate::downloader::progress::{parse_progress_line, OutputTracker, ProgressLine};
use crate::downloader::traits::{DownloaderBackend, ProgressEmitter};
use crate::downloader::utils::{run_output_with_timeout, run_streaming, ytdlp_cmd};

/// Method A: the yt-dlp executable
pub struct YtDlpBackend {
    ytdlp_bin: String,
    timeout_secs: Option<u64>,
}

impl YtDlpBackend {
    pub fn new(explicit_path: Option<&str>, timeout_secs: Option<u64>) -> Self {
        Self {
            ytdlp_bin: ytdlp_cmd(explicit_path),
            timeout_secs,
        }
    }

    fn info_args(url: &str) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            url.to_string(),
        ]
    }

    fn download_args(url: &str, output_dir: &Path) -> Vec<String> {
        vec![
            "--no-playlist".to_string(),
            "--newline".to_string(),
            "--no-update".to_string(),
            "-P".to_string(),
            output_dir.to_string_lossy().to_string(),
            // Default template is "%(title)s [%(id)s].%(ext)s"
            "-o".to_string(),
            "%(title)s.%(ext)s".to_string(),
            url.to_string(),
        ]
    }
}

impl Default for YtDlpBackend {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
impl DownloaderBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn method(&self) -> Method {
        Method::YtDlp
    }

    async fn get_video_info(&self, url: &str) -> Result<VideoInfo, DownloadError> {
        let output = run_output_with_timeout(&self.ytdlp_bin, &Self::info_args(url), self.timeout_secs).await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(error.to_string().into());
        }

        parse_video_info(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        emitter: &ProgressEmitter,
    ) -> Result<Option<PathBuf>, DownloadError> {
        emitter.status(format!("yt-dlp: starting download into {}", output_dir.display()));

        let mut tracker = OutputTracker::default();
        let mut last_reported = -1.0_f32;
        let output = run_streaming(
            &self.ytdlp_bin,
            &Self::download_args(url, output_dir),
            self.timeout_secs,
            |line| {
                let Some(parsed) = parse_progress_line(line) else {
                    return;
                };
                tracker.observe(&parsed);
                match parsed {
                    // Only every 10% or so, yt-dlp prints several lines a second
                    ProgressLine::Percent { percent, status } => {
                        if percent >= 100.0 || percent - last_reported >= 10.0 {
                            last_reported = percent;
                            emitter.emit(DownloadProgress { percent, status });
                        }
                    }
                    ProgressLine::Destination(path) => {
                        emitter.status(format!("yt-dlp: writing {}", display_name(&path)));
                    }
                    ProgressLine::Merging(_) => emitter.status("yt-dlp: merging video and audio..."),
                    ProgressLine::AlreadyDownloaded(path) => {
                        emitter.status(format!("yt-dlp: {} already downloaded", display_name(&path)));
                    }
                }
            },
        )
        .await?;

        if output.status.success() {
            Ok(tracker.into_file())
        } else {
            let error = String::from_utf8_lossy(&output.stderr);
            Err(error.to_string().into())
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_video_info(stdout: &[u8]) -> Result<VideoInfo, DownloadError> {
    let json_str = String::from_utf8_lossy(stdout);
    let json: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| DownloadError::ParseError(format!("JSON parse error: {}", e)))?;

    Ok(VideoInfo {
        id: json["id"].as_str().unwrap_or("").to_string(),
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        uploader: json["uploader"].as_str().unwrap_or("Unknown").to_string(),
        duration: format_duration(json["duration"].as_f64().unwrap_or(0.0) as u64),
    })
}
