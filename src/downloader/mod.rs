// Downloader module - capability adapters behind a fallback orchestrator

pub mod backends;
pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::DownloadError;
pub use models::{AttemptRecord, DownloadOutcome, DownloadProgress, DownloadRequest, Method, VideoInfo};
pub use orchestrator::{BackendOptions, Downloader};
pub use traits::{ConsoleProgress, DownloaderBackend, ProgressEmitter, ProgressSink, SilentProgress};
