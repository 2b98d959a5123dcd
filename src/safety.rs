//! Fixed string tables used by the session controller.
//!
//! These are data, not logic: the keyword list, the emergency template, and
//! the network-failure fallback template can be externalized to configuration
//! without touching the streaming code.

/// Obviously urgent phrases that short-circuit the network call.
///
/// The scan is precision-oriented: it only needs to catch unambiguous
/// emergencies fast, the backend remains responsible for full classification.
const EMERGENCY_KEYWORDS: &[&str] = &[
    "chest pain",
    "heart attack",
    "stroke",
    "can't breathe",
    "cannot breathe",
    "difficulty breathing",
    "unconscious",
    "severe bleeding",
    "seizure",
    "anaphylaxis",
    "overdose",
    "suicide",
    "call 911",
];

/// Fixed safety message returned by the emergency fast path.
pub const EMERGENCY_RESPONSE: &str = "This sounds like it could be a medical emergency. \
Please call your local emergency number (911 in the US) or go to the nearest \
emergency room right away. This assistant cannot provide emergency care.";

/// Fixed diagnostic message substituted when the backend is unreachable.
pub const FALLBACK_RESPONSE: &str = "I'm having trouble reaching the assistant service \
right now. Please check your connection and try again in a moment.";

/// Case-insensitive scan of an outgoing query against the keyword list.
pub fn detect_emergency(query: &str) -> bool {
    let lowered = query.to_lowercase();
    EMERGENCY_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}
