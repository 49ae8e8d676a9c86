//! Rate-limit detection from upstream error text.
//!
//! The AI service does not expose a structured error code for quota
//! exhaustion, so detection is by substring.  The markers are centralised
//! here so they can be extended when the upstream wording changes.

/// Case-insensitive substrings that identify a rate-limit failure.
const RATE_LIMIT_MARKERS: &[&str] = &["quota", "429", "limit"];

/// Returns `true` when `message` looks like an upstream rate-limit error.
pub fn is_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}
