use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{format_duration, Method, VideoInfo};
use crate::downloader::traits::{DownloaderBackend, ProgressEmitter};
use crate::downloader::utils::{python_cmd, run_output_with_timeout};

// argv: -c <info|download> <url> [output dir]
// Prints exactly one JSON object on stdout.
const PYTUBE_SCRIPT: &str = r#"
import json, sys
from pytube import YouTube

mode, url = sys.argv[1], sys.argv[2]
yt = YouTube(url)
if mode == "info":
    print(json.dumps({"id": yt.video_id, "title": yt.title, "author": yt.author, "length": yt.length}))
else:
    stream = yt.streams.get_highest_resolution()
    if stream is None:
        sys.exit("ERROR: no progressive stream available")
    path = stream.download(output_path=sys.argv[3])
    print(json.dumps({"path": path, "title": yt.title}))
"#;

#[derive(Debug, Deserialize)]
struct PytubeInfo {
    id: Option<String>,
    title: Option<String>,
    author: Option<String>,
    length: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PytubeDownload {
    path: Option<PathBuf>,
}

/// Method B: pytube through the Python interpreter
pub struct PytubeBackend {
    python_cmd: String,
    timeout_secs: Option<u64>,
}

impl PytubeBackend {
    pub fn new(explicit_python: Option<&str>, timeout_secs: Option<u64>) -> Self {
        Self {
            python_cmd: python_cmd(explicit_python),
            timeout_secs,
        }
    }

    fn script_args(mode: &str, url: &str, output_dir: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "-c".to_string(),
            PYTUBE_SCRIPT.to_string(),
            mode.to_string(),
            url.to_string(),
        ];
        if let Some(dir) = output_dir {
            args.push(dir.to_string_lossy().to_string());
        }
        args
    }

    async fn run_script(&self, args: Vec<String>) -> Result<Vec<u8>, DownloadError> {
        let output = run_output_with_timeout(&self.python_cmd, &args, self.timeout_secs).await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(error.to_string().into());
        }

        Ok(output.stdout)
    }
}

impl Default for PytubeBackend {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
impl DownloaderBackend for PytubeBackend {
    fn name(&self) -> &'static str {
        "pytube"
    }

    fn method(&self) -> Method {
        Method::Pytube
    }

    async fn get_video_info(&self, url: &str) -> Result<VideoInfo, DownloadError> {
        let stdout = self.run_script(Self::script_args("info", url, None)).await?;
        parse_info(&stdout)
    }

    async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        emitter: &ProgressEmitter,
    ) -> Result<Option<PathBuf>, DownloadError> {
        emitter.status(format!(
            "pytube: downloading highest resolution stream into {}",
            output_dir.display()
        ));

        let stdout = self
            .run_script(Self::script_args("download", url, Some(output_dir)))
            .await?;
        parse_download(&stdout)
    }
}

fn last_json_line(stdout: &[u8]) -> Result<String, DownloadError> {
    String::from_utf8_lossy(stdout)
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .map(str::to_string)
        .ok_or_else(|| DownloadError::ParseError("pytube printed no JSON".to_string()))
}

fn parse_info(stdout: &[u8]) -> Result<VideoInfo, DownloadError> {
    let line = last_json_line(stdout)?;
    let info: PytubeInfo = serde_json::from_str(&line)
        .map_err(|e| DownloadError::ParseError(format!("JSON parse error: {}", e)))?;

    Ok(VideoInfo {
        id: info.id.unwrap_or_default(),
        title: info.title.unwrap_or_else(|| "Unknown".to_string()),
        uploader: info.author.unwrap_or_else(|| "Unknown".to_string()),
        duration: format_duration(info.length.unwrap_or(0)),
    })
}

fn parse_download(stdout: &[u8]) -> Result<Option<PathBuf>, DownloadError> {
    let line = last_json_line(stdout)?;
    let result: PytubeDownload = serde_json::from_str(&line)
        .map_err(|e| DownloadError::ParseError(format!("JSON parse error: {}", e)))?;
    Ok(result.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info() {
        let out = br#"{"id": "49P7Oy3hQRE", "title": "Lecture 1", "author": "MIT", "length": 3725}"#;
        let info = parse_info(out).unwrap();
        assert_eq!(info.id, "49P7Oy3hQRE");
        assert_eq!(info.uploader, "MIT");
        assert_eq!(info.duration, "62:05");
    }

    #[test]
    fn test_parse_download_skips_noise() {
        let out = b"some warning\n{\"path\": \"/tmp/out/Lecture 1.mp4\", \"title\": \"Lecture 1\"}\n";
        assert_eq!(
            parse_download(out).unwrap(),
            Some(PathBuf::from("/tmp/out/Lecture 1.mp4"))
        );
    }

    #[test]
    fn test_parse_download_without_json() {
        assert!(matches!(parse_download(b""), Err(DownloadError::ParseError(_))));
    }

    #[test]
    fn test_script_args_order() {
        let args = PytubeBackend::script_args("download", "https://youtu.be/x", Some(Path::new("out")));
        assert_eq!(args[0], "-c");
        assert_eq!(&args[2..], ["download", "https://youtu.be/x", "out"]);
    }
}
