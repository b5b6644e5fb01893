// yt-dlp `--newline` output parsing

use std::path::PathBuf;

use regex::Regex;

/// A line of yt-dlp output we care about
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressLine {
    /// `[download]  12.5% of ~ 310.04MiB at 374.36KiB/s ETA 11:59`
    Percent { percent: f32, status: String },
    /// `[download] Destination: <path>`
    Destination(PathBuf),
    /// `[Merger] Merging formats into "<path>"`
    Merging(PathBuf),
    /// `[download] <path> has already been downloaded`
    AlreadyDownloaded(PathBuf),
}

lazy_static::lazy_static! {
    static ref PROGRESS_RE: Option<Regex> = Regex::new(
        r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+\s*\S*/s|Unknown speed))?(?:\s+ETA\s+(\S+))?"
    ).ok();
    static ref DEST_RE: Option<Regex> = Regex::new(r"\[download\]\s+Destination:\s+(.+)").ok();
    static ref MERGE_RE: Option<Regex> = Regex::new(r#"\[Merger\]\s+Merging formats into\s+"(.+)""#).ok();
    static ref ALREADY_RE: Option<Regex> = Regex::new(r"\[download\]\s+(.+) has already been downloaded").ok();
}

pub fn parse_progress_line(line: &str) -> Option<ProgressLine> {
    let line = line.trim_end();

    if let Some(caps) = PROGRESS_RE.as_ref().and_then(|re| re.captures(line)) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let status = match (caps.get(3), caps.get(4)) {
            (Some(speed), Some(eta)) => format!("{} @ {} ETA {}", size, speed.as_str(), eta.as_str()),
            (Some(speed), None) => format!("{} @ {}", size, speed.as_str()),
            _ => size.to_string(),
        };
        return Some(ProgressLine::Percent { percent, status });
    }

    if let Some(caps) = MERGE_RE.as_ref().and_then(|re| re.captures(line)) {
        return Some(ProgressLine::Merging(PathBuf::from(caps.get(1)?.as_str())));
    }

    if let Some(caps) = DEST_RE.as_ref().and_then(|re| re.captures(line)) {
        return Some(ProgressLine::Destination(PathBuf::from(caps.get(1)?.as_str())));
    }

    if let Some(caps) = ALREADY_RE.as_ref().and_then(|re| re.captures(line)) {
        return Some(ProgressLine::AlreadyDownloaded(PathBuf::from(caps.get(1)?.as_str())));
    }

    None
}

/// Tracks the final output file across a run's lines.
///
/// A merge target wins over any earlier destination since the separate
/// video and audio streams are removed after merging.
#[derive(Debug, Default)]
pub struct OutputTracker {
    file: Option<PathBuf>,
    merged: bool,
}

impl OutputTracker {
    pub fn observe(&mut self, line: &ProgressLine) {
        match line {
            ProgressLine::Merging(p) => {
                self.file = Some(p.clone());
                self.merged = true;
            }
            ProgressLine::Destination(p) | ProgressLine::AlreadyDownloaded(p) if !self.merged => {
                self.file = Some(p.clone());
            }
            _ => {}
        }
    }

    pub fn into_file(self) -> Option<PathBuf> {
        self.file
    }
}
