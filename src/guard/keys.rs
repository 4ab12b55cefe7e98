//! Identity key helpers
//!
//! Identities must be normalized exactly once, before any check or
//! record call, so both sides of a check/record pair land on the same
//! table slot. Client IPs are used as-is; emails go through
//! `normalize_email`.

/// Lowercase and trim an email for use as a tracking key
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A usable tracking key is non-blank
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
