// Common data models for downloader

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Download capability, one per wrapped tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// yt-dlp executable
    #[default]
    YtDlp,
    /// pytube, driven through the Python interpreter
    Pytube,
}

impl Method {
    /// Map the `prefer_secondary` flag onto a method
    pub fn from_preference(prefer_secondary: bool) -> Self {
        if prefer_secondary {
            Self::Pytube
        } else {
            Self::YtDlp
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::YtDlp => Self::Pytube,
            Self::Pytube => Self::YtDlp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YtDlp => "yt-dlp",
            Self::Pytube => "pytube",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One video to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub output_directory: PathBuf,
    pub preferred_method: Method,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, output_directory: impl Into<PathBuf>, preferred_method: Method) -> Self {
        Self {
            url: url.into(),
            output_directory: output_directory.into(),
            preferred_method,
        }
    }
}

/// Result of one attempt inside a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub method: Method,
    /// `None` when the attempt succeeded
    pub error: Option<String>,
}

/// Result of a whole request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub succeeded: bool,
    pub method_used: Option<Method>,
    pub error_message: Option<String>,
    /// Media file reported by the provider, when it told us
    pub file: Option<PathBuf>,
    pub attempts: Vec<AttemptRecord>,
}

impl DownloadOutcome {
    pub fn success(method: Method, file: Option<PathBuf>, attempts: Vec<AttemptRecord>) -> Self {
        Self {
            succeeded: true,
            method_used: Some(method),
            error_message: None,
            file,
            attempts,
        }
    }

    pub fn failure(message: impl Into<String>, attempts: Vec<AttemptRecord>) -> Self {
        Self {
            succeeded: false,
            method_used: None,
            error_message: Some(message.into()),
            file: None,
            attempts,
        }
    }
}

/// Per-request lifecycle, traced as the orchestrator moves through it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    TryingPreferred,
    TryingOther,
    Succeeded,
    Failed,
}

/// Video information discovered before downloading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub uploader: String,
    pub duration: String,
}

/// Download progress information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}

impl DownloadProgress {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            percent: 0.0,
            status: status.into(),
        }
    }
}

/// Format seconds as `m:ss`
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_flag() {
        assert_eq!(Method::from_preference(false), Method::YtDlp);
        assert_eq!(Method::from_preference(true), Method::Pytube);
        assert_eq!(Method::YtDlp.other(), Method::Pytube);
        assert_eq!(Method::Pytube.other(), Method::YtDlp);
    }

    #[test]
    fn test_method_deserializes_kebab_case() {
        #[derive(Deserialize)]
        struct Holder {
            method: Method,
        }
        let holder: Holder = serde_json::from_str(r#"{"method":"yt-dlp"}"#).unwrap();
        assert_eq!(holder.method, Method::YtDlp);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(212), "3:32");
        assert_eq!(format_duration(0), "0:00");
    }
}
