// Sequential batch runner

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::downloader::{DownloadOutcome, DownloadRequest, Downloader, Method};

/// Totals for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        self.total += 1;
        if outcome.succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Percentage of successful requests; `None` for an empty batch
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.succeeded as f64 / self.total as f64 * 100.0)
    }

    /// Success rate to one decimal place, e.g. `83.3%`
    pub fn formatted_rate(&self) -> Option<String> {
        self.success_rate().map(|rate| format!("{:.1}%", rate))
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total, {} succeeded, {} failed",
            self.total, self.succeeded, self.failed
        )?;
        if let Some(rate) = self.formatted_rate() {
            write!(f, " ({} success rate)", rate)?;
        }
        Ok(())
    }
}

pub struct BatchRunner {
    downloader: Downloader,
}

impl BatchRunner {
    pub fn new(downloader: Downloader) -> Self {
        Self { downloader }
    }

    /// Download every URL in order. A failed URL is counted and skipped;
    /// the batch always runs to the end.
    pub async fn run<S: AsRef<str>>(&self, urls: &[S], output_dir: &Path, preferred: Method) -> BatchSummary {
        let emitter = self.downloader.emitter();
        let mut summary = BatchSummary::default();
        let mut failed_urls = Vec::new();

        emitter.status(format!(
            "Downloading {} video(s) into {} (preferred: {}, fallback: {})",
            urls.len(),
            output_dir.display(),
            preferred,
            preferred.other()
        ));

        for (idx, url) in urls.iter().enumerate() {
            let url = url.as_ref();
            emitter.status(format!("\n[{}/{}] {}", idx + 1, urls.len(), url));

            let request = DownloadRequest::new(url, output_dir, preferred);
            let outcome = self.downloader.download(&request).await;
            if !outcome.succeeded {
                let reason = outcome.error_message.clone().unwrap_or_default();
                emitter.status(format!("✗ Giving up on {}", url));
                failed_urls.push((url.to_string(), reason));
            }
            summary.record(&outcome);
        }

        emitter.status("\n=== Download summary ===");
        emitter.status(format!("Total:     {}", summary.total));
        emitter.status(format!("Succeeded: {}", summary.succeeded));
        emitter.status(format!("Failed:    {}", summary.failed));
        if let Some(rate) = summary.formatted_rate() {
            emitter.status(format!("Success rate: {}", rate));
        }
        if !failed_urls.is_empty() {
            emitter.status("Failed URLs:");
            for (url, reason) in &failed_urls {
                emitter.status(format!("  - {} ({})", url, reason));
            }
        }

        tracing::debug!(%summary, "batch finished");
        summary
    }
}
