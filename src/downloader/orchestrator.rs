// Orchestrator with fallback logic

use super::backends::{PytubeBackend, YtDlpBackend};
use super::diagnostics::diagnose_error;
use super::errors::DownloadError;
use super::models::{AttemptRecord, DownloadOutcome, DownloadRequest, Method, RequestState};
use super::traits::{DownloaderBackend, ProgressEmitter};
use crate::url::normalize;

/// Tool locations and limits shared by the built-in backends
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    pub ytdlp_path: Option<String>,
    pub python_path: Option<String>,
    pub timeout_secs: Option<u64>,
}

pub struct Downloader {
    backends: Vec<Box<dyn DownloaderBackend>>,
    emitter: ProgressEmitter,
}

impl Downloader {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
            emitter: ProgressEmitter::console(),
        }
    }

    /// yt-dlp and pytube, in that registration order
    pub fn with_default_backends(options: &BackendOptions) -> Self {
        let mut downloader = Self::new();
        downloader.add_backend(Box::new(YtDlpBackend::new(
            options.ytdlp_path.as_deref(),
            options.timeout_secs,
        )));
        downloader.add_backend(Box::new(PytubeBackend::new(
            options.python_path.as_deref(),
            options.timeout_secs,
        )));
        downloader
    }

    pub fn with_emitter(mut self, emitter: ProgressEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn add_backend(&mut self, backend: Box<dyn DownloaderBackend>) {
        self.backends.push(backend);
    }

    pub fn emitter(&self) -> &ProgressEmitter {
        &self.emitter
    }

    /// Backends in the order they will be tried: `preferred` first, then
    /// the rest in registration order.
    pub fn fallback_order(&self, preferred: Method) -> Vec<&dyn DownloaderBackend> {
        let (mut order, rest): (Vec<_>, Vec<_>) = self
            .backends
            .iter()
            .map(|b| b.as_ref())
            .partition(|b| b.method() == preferred);
        order.extend(rest);
        order
    }

    pub async fn download(&self, request: &DownloadRequest) -> DownloadOutcome {
        let mut state = RequestState::Pending;
        tracing::debug!(url = %request.url, ?state, "request received");

        if let Err(e) = tokio::fs::create_dir_all(&request.output_directory).await {
            let err = DownloadError::Io(e);
            self.emitter.status(format!(
                "✗ Cannot create output directory {}: {}",
                request.output_directory.display(),
                err
            ));
            tracing::debug!(url = %request.url, state = ?RequestState::Failed, "request finished");
            return DownloadOutcome::failure(err.to_string(), Vec::new());
        }

        let url = normalize(&request.url);
        if url != request.url {
            tracing::debug!("normalized {} -> {}", request.url, url);
        }

        let order = self.fallback_order(request.preferred_method);
        if order.is_empty() {
            return DownloadOutcome::failure("no download methods configured", Vec::new());
        }

        let mut attempts = Vec::with_capacity(order.len());
        for (idx, backend) in order.iter().enumerate() {
            state = if idx == 0 {
                RequestState::TryingPreferred
            } else {
                RequestState::TryingOther
            };
            tracing::debug!(%url, ?state, backend = backend.name(), "trying backend");
            self.emitter.status(format!("→ Trying {} for {}", backend.name(), url));

            match backend.attempt(&url, &request.output_directory, &self.emitter).await {
                Ok(file) => {
                    let saved = file
                        .as_ref()
                        .map(|f| format!(": {}", f.display()))
                        .unwrap_or_default();
                    self.emitter
                        .status(format!("✓ Download complete with {}{}", backend.name(), saved));
                    attempts.push(AttemptRecord {
                        method: backend.method(),
                        error: None,
                    });
                    tracing::debug!(%url, state = ?RequestState::Succeeded, "request finished");
                    return DownloadOutcome::success(backend.method(), file, attempts);
                }
                Err(e) => {
                    let message = e.to_string();
                    let hint = diagnose_error(&message)
                        .map(|reason| {
                            if reason.is_permanent() {
                                format!(" ({}, other methods will likely fail too)", reason.description())
                            } else {
                                format!(" ({})", reason.description())
                            }
                        })
                        .unwrap_or_default();
                    tracing::debug!(backend = backend.name(), error = %message, "download attempt failed");
                    self.emitter
                        .status(format!("✗ {} failed{}: {}", backend.name(), hint, message));
                    attempts.push(AttemptRecord {
                        method: backend.method(),
                        error: Some(message),
                    });
                }
            }
        }

        tracing::debug!(%url, state = ?RequestState::Failed, "request finished");
        let summary = attempts
            .iter()
            .filter_map(|a| a.error.as_ref().map(|e| format!("{}: {}", a.method, e)))
            .collect::<Vec<_>>()
            .join("; ");
        DownloadOutcome::failure(format!("all download methods failed ({})", summary), attempts)
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::downloader::models::VideoInfo;

    /// Backend that succeeds only for the listed video ids
    pub(crate) struct FakeBackend {
        method: Method,
        succeeds_for: HashSet<String>,
        pub(crate) calls: Arc<AtomicUsize>,
        pub(crate) seen_urls: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        pub(crate) fn new(method: Method, succeeds_for: &[&str]) -> Self {
            Self {
                method,
                succeeds_for: succeeds_for.iter().map(|s| s.to_string()).collect(),
                calls: Arc::new(AtomicUsize::new(0)),
                seen_urls: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }

        pub(crate) fn always(method: Method, succeed: bool) -> Self {
            let mut backend = Self::new(method, &[]);
            if succeed {
                backend.succeeds_for.insert("*".to_string());
            }
            backend
        }

        fn succeeds(&self, url: &str) -> bool {
            self.succeeds_for.contains("*")
                || crate::url::extract_video_id(url).is_some_and(|id| self.succeeds_for.contains(id))
        }
    }

    #[async_trait]
    impl DownloaderBackend for FakeBackend {
        fn name(&self) -> &'static str {
            match self.method {
                Method::YtDlp => "fake-yt-dlp",
                Method::Pytube => "fake-pytube",
            }
        }

        fn method(&self) -> Method {
            self.method
        }

        async fn get_video_info(&self, url: &str) -> Result<VideoInfo, DownloadError> {
            Ok(VideoInfo {
                id: crate::url::extract_video_id(url).unwrap_or_default().to_string(),
                title: "Test video".to_string(),
                uploader: "Tester".to_string(),
                duration: "0:10".to_string(),
            })
        }

        async fn download(
            &self,
            url: &str,
            output_dir: &Path,
            _emitter: &ProgressEmitter,
        ) -> Result<Option<PathBuf>, DownloadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_urls.lock().unwrap().push(url.to_string());
            if self.succeeds(url) {
                Ok(Some(output_dir.join("Test video.mp4")))
            } else {
                Err(DownloadError::Unknown(format!("{} refused", self.name())))
            }
        }
    }

    pub(crate) fn downloader_with(a: FakeBackend, b: FakeBackend) -> Downloader {
        let mut downloader = Downloader::new().with_emitter(ProgressEmitter::silent());
        downloader.add_backend(Box::new(a));
        downloader.add_backend(Box::new(b));
        downloader
    }

    const URL: &str = "https://www.youtube.com/watch?v=49P7Oy3hQRE&list=PL123";

    #[tokio::test]
    async fn test_preferred_success_skips_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let a = FakeBackend::always(Method::YtDlp, true);
        let b = FakeBackend::always(Method::Pytube, true);
        let (a_calls, b_calls) = (a.calls.clone(), b.calls.clone());
        let downloader = downloader_with(a, b);

        let outcome = downloader
            .download(&DownloadRequest::new(URL, dir.path(), Method::YtDlp))
            .await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.method_used, Some(Method::YtDlp));
        assert_eq!(outcome.file, Some(dir.path().join("Test video.mp4")));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_other_method() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = downloader_with(
            FakeBackend::always(Method::YtDlp, false),
            FakeBackend::always(Method::Pytube, true),
        );

        let outcome = downloader
            .download(&DownloadRequest::new(URL, dir.path(), Method::YtDlp))
            .await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.method_used, Some(Method::Pytube));
        assert_eq!(outcome.error_message, None);
        assert_eq!(outcome.attempts.len(), 2);
        assert!(outcome.attempts[0].error.is_some());
        assert!(outcome.attempts[1].error.is_none());
    }

    #[tokio::test]
    async fn test_both_fail() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = downloader_with(
            FakeBackend::always(Method::YtDlp, false),
            FakeBackend::always(Method::Pytube, false),
        );

        let outcome = downloader
            .download(&DownloadRequest::new(URL, dir.path(), Method::YtDlp))
            .await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.method_used, None);
        let message = outcome.error_message.unwrap();
        assert!(message.contains("yt-dlp: Unknown error: fake-yt-dlp refused"));
        assert!(message.contains("pytube: Unknown error: fake-pytube refused"));
    }

    #[derive(Default)]
    struct RecordingSink(std::sync::Mutex<Vec<String>>);

    impl crate::downloader::traits::ProgressSink for RecordingSink {
        fn emit(&self, progress: crate::downloader::models::DownloadProgress) {
            self.0.lock().unwrap().push(progress.status);
        }
    }

    #[tokio::test]
    async fn test_failed_attempt_reported_once_on_progress_channel() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let mut downloader = Downloader::new().with_emitter(ProgressEmitter::new(sink.clone()));
        downloader.add_backend(Box::new(FakeBackend::always(Method::YtDlp, false)));
        downloader.add_backend(Box::new(FakeBackend::always(Method::Pytube, true)));

        let outcome = downloader
            .download(&DownloadRequest::new(URL, dir.path(), Method::YtDlp))
            .await;

        assert!(outcome.succeeded);
        let lines = sink.0.lock().unwrap();
        let failures: Vec<_> = lines.iter().filter(|l| l.starts_with("✗ fake-yt-dlp failed")).collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("fake-yt-dlp refused"));
    }

    #[tokio::test]
    async fn test_preference_controls_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = FakeBackend::always(Method::YtDlp, true);
        let b = FakeBackend::always(Method::Pytube, true);
        let (a_calls, b_calls) = (a.calls.clone(), b.calls.clone());
        let downloader = downloader_with(a, b);

        let outcome = downloader
            .download(&DownloadRequest::new(URL, dir.path(), Method::Pytube))
            .await;

        assert_eq!(outcome.method_used, Some(Method::Pytube));
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backends_receive_normalized_url_and_dir_is_created() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("nested").join("videos");
        let a = FakeBackend::always(Method::YtDlp, true);
        let seen = a.seen_urls.clone();
        let downloader = downloader_with(a, FakeBackend::always(Method::Pytube, true));

        let outcome = downloader
            .download(&DownloadRequest::new(URL, &out, Method::YtDlp))
            .await;

        assert!(outcome.succeeded);
        assert!(out.is_dir());
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["https://www.youtube.com/watch?v=49P7Oy3hQRE".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unusable_output_dir_is_a_failed_outcome() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let downloader = downloader_with(
            FakeBackend::always(Method::YtDlp, true),
            FakeBackend::always(Method::Pytube, true),
        );

        let outcome = downloader
            .download(&DownloadRequest::new(URL, file.join("sub"), Method::YtDlp))
            .await;

        assert!(!outcome.succeeded);
        assert!(outcome.attempts.is_empty());
    }

    #[test]
    fn test_fallback_order_keeps_registration_order_for_the_rest() {
        let downloader = downloader_with(
            FakeBackend::always(Method::YtDlp, true),
            FakeBackend::always(Method::Pytube, true),
        );
        let names: Vec<_> = downloader
            .fallback_order(Method::Pytube)
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(names, ["fake-pytube", "fake-yt-dlp"]);
    }

    #[tokio::test]
    async fn test_no_backends() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new().with_emitter(ProgressEmitter::silent());
        let outcome = downloader
            .download(&DownloadRequest::new(URL, dir.path(), Method::YtDlp))
            .await;
        assert!(!outcome.succeeded);
    }
}
