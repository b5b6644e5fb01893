// Failure diagnostics - turns provider error text into a short reason
//
// Only used for reporting; the fallback order never depends on it.

use serde::{Deserialize, Serialize};

/// Why a provider failed, as far as its error text tells us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// HTTP 403 Forbidden
    Http403Forbidden,

    /// Age-restricted content requiring login
    AgeRestricted,

    /// Geographic restriction
    GeoBlocked,

    /// Network timeout (soft IP block)
    NetworkTimeout,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// Bot detection triggered
    BotDetection,

    /// Private video requiring authorization
    PrivateVideo,

    /// Video deleted or unavailable
    VideoUnavailable,

    /// Provider executable or module missing
    ToolMissing,
}

impl FailureReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "access denied (HTTP 403)",
            Self::AgeRestricted => "age-restricted content",
            Self::GeoBlocked => "not available in this country",
            Self::NetworkTimeout => "network timeout",
            Self::RateLimited => "rate limited by YouTube",
            Self::BotDetection => "bot detection triggered",
            Self::PrivateVideo => "private video",
            Self::VideoUnavailable => "video unavailable",
            Self::ToolMissing => "tool not installed",
        }
    }

    /// The other provider cannot do better either
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::PrivateVideo | Self::VideoUnavailable)
    }
}

const PATTERNS: &[(&str, FailureReason)] = &[
    ("no module named", FailureReason::ToolMissing),
    ("tool not found", FailureReason::ToolMissing),
    ("command not found", FailureReason::ToolMissing),
    ("confirm you're not a bot", FailureReason::BotDetection),
    ("sign in to confirm your age", FailureReason::AgeRestricted),
    ("age restricted", FailureReason::AgeRestricted),
    ("agerestrictederror", FailureReason::AgeRestricted),
    ("not available in your country", FailureReason::GeoBlocked),
    ("geo restricted", FailureReason::GeoBlocked),
    ("private video", FailureReason::PrivateVideo),
    ("videoprivate", FailureReason::PrivateVideo),
    ("video unavailable", FailureReason::VideoUnavailable),
    ("videounavailable", FailureReason::VideoUnavailable),
    ("http error 429", FailureReason::RateLimited),
    ("too many requests", FailureReason::RateLimited),
    ("http error 403", FailureReason::Http403Forbidden),
    ("forbidden", FailureReason::Http403Forbidden),
    ("timed out", FailureReason::NetworkTimeout),
    ("timeout", FailureReason::NetworkTimeout),
];

/// First matching reason, checked in table order
pub fn diagnose_error(error: &str) -> Option<FailureReason> {
    let lower = error.to_lowercase();
    PATTERNS
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, reason)| *reason)
}
