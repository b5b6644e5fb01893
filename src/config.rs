// Batch configuration: defaults, TOML file, then command-line overrides

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::downloader::{BackendOptions, Method};

pub const DEFAULT_OUTPUT_DIR: &str = "./output";
const APP_DIR: &str = "tubefetch";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything one batch run needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub urls: Vec<String>,
    pub output_dir: PathBuf,
    pub preferred: Method,
    /// Per-process limit; `None` waits for the tool indefinitely
    pub timeout_secs: Option<u64>,
    pub ytdlp_path: Option<String>,
    pub python_path: Option<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            preferred: Method::YtDlp,
            timeout_secs: None,
            ytdlp_path: None,
            python_path: None,
        }
    }
}

impl BatchConfig {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// `<config_dir>/tubefetch/config.toml`, whether or not it exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Explicit file if given, else the default file when present, else defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Append URLs from a list file: one per line, `#` starts a comment
    pub fn add_urls_from_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.urls.extend(parse_url_list(&content));
        Ok(())
    }

    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            ytdlp_path: self.ytdlp_path.clone(),
            python_path: self.python_path.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
