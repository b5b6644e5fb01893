use serde::{Deserialize, Serialize};
use std::process::Command;

use super::orchestrator::BackendOptions;
use super::utils::{find_executable, python_cmd};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Pytube,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Pytube => "pytube",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    /// Executable that runs the tool (the python interpreter for pytube)
    pub path: Option<String>,
    pub is_available: bool,
}

pub struct ToolManager {
    ytdlp_path: Option<String>,
    python_path: Option<String>,
}

impl ToolManager {
    pub fn new(options: &BackendOptions) -> Self {
        Self {
            ytdlp_path: options
                .ytdlp_path
                .clone()
                .or_else(|| std::env::var("TUBEFETCH_YTDLP").ok()),
            python_path: options.python_path.clone(),
        }
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let (path, version) = match tool_type {
            ToolType::YtDlp => self.detect_ytdlp(),
            ToolType::Pytube => self.detect_pytube(),
        };

        ToolInfo {
            name: tool_type.as_str().to_string(),
            tool_type,
            is_available: version.is_some(),
            version,
            path,
        }
    }

    pub fn get_all_tools(&self) -> Vec<ToolInfo> {
        vec![
            self.get_tool_info(ToolType::YtDlp),
            self.get_tool_info(ToolType::Pytube),
        ]
    }

    fn detect_ytdlp(&self) -> (Option<String>, Option<String>) {
        match find_executable("yt-dlp", self.ytdlp_path.as_deref()) {
            Some(path) => {
                let version = run_for_stdout(&path, &["--version"]);
                (Some(path), version)
            }
            None => (None, None),
        }
    }

    fn detect_pytube(&self) -> (Option<String>, Option<String>) {
        let python = python_cmd(self.python_path.as_deref());
        let version = run_for_stdout(&python, &["-c", "import pytube; print(pytube.__version__)"]);
        (Some(python), version)
    }
}

fn run_for_stdout(program: &str, args: &[&str]) -> Option<String> {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => {
            let out = String::from_utf8_lossy(&output.stdout).trim().to_string();
            Some(out)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tools_are_unavailable() {
        let manager = ToolManager::new(&BackendOptions {
            ytdlp_path: Some("/nonexistent/yt-dlp".to_string()),
            python_path: Some("/nonexistent/python3".to_string()),
            timeout_secs: None,
        });

        for info in manager.get_all_tools() {
            assert!(!info.is_available, "{} should be unavailable", info.name);
            assert!(info.version.is_none());
        }
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(ToolType::YtDlp.as_str(), "yt-dlp");
        assert_eq!(ToolType::Pytube.as_str(), "pytube");
    }
}
