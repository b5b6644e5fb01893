// Error types for download capabilities

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network timeout while talking to YouTube
    #[error("Network timeout: YouTube is not responding")]
    NetworkTimeout,

    /// YouTube refused the request (429, bot detection, etc.)
    #[error("YouTube refused the request: {0}")]
    Blocked(String),

    /// yt-dlp, python or the pytube module is missing
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// URL the provider could not handle
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Provider output was not the JSON we expected
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Child process could not be started or exited with an error
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Child process exceeded the configured timeout
    #[error("Timed out after {0}s")]
    TimedOut(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Classify raw stderr text from a provider
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::NetworkTimeout;
        }

        if lower.contains("429") || lower.contains("confirm you're not a bot") || lower.contains("blocked") {
            return Self::Blocked(first_error_line(&s));
        }

        if lower.contains("no module named") || lower.contains("command not found") || lower.contains("no such file") {
            return Self::ToolNotFound(first_error_line(&s));
        }

        if lower.contains("unsupported url") || lower.contains("invalid url") || lower.contains("regexmatcherror") {
            return Self::InvalidUrl(first_error_line(&s));
        }

        if lower.contains("json") {
            return Self::ParseError(first_error_line(&s));
        }

        Self::Unknown(first_error_line(&s))
    }
}

/// Most useful line of a stderr dump: the first `ERROR:` line, else the last non-empty one.
pub fn first_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr.lines().map(str::trim).rev().find(|l| !l.is_empty()))
        .unwrap_or("no error output")
        .to_string()
}
