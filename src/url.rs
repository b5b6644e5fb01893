// Video URL normalization

use regex::Regex;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

lazy_static::lazy_static! {
    // `v=<id>` for watch links, `/<id>` for youtu.be, shorts and embed links
    static ref VIDEO_ID_RE: Option<Regex> = Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").ok();
}

/// The 11-character video identifier, if the URL carries one
pub fn extract_video_id(url: &str) -> Option<&str> {
    let re = VIDEO_ID_RE.as_ref()?;
    re.captures(url).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Reduce a video URL to its canonical watch form.
///
/// Playlist, radio and tracking parameters are dropped. Input without a
/// recognizable identifier comes back unchanged.
pub fn normalize(url: &str) -> String {
    match extract_video_id(url) {
        Some(id) => format!("{}{}", WATCH_URL, id),
        None => {
            tracing::debug!(url, "no video id found, using url as is");
            url.to_string()
        }
    }
}
