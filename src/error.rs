//! Error types
//!
//! Defines domain-specific error types for the throttle crate.

use std::fmt;

/// Policy validation errors raised at limiter construction
#[derive(Debug, PartialEq, Eq)]
pub enum PolicyError {
    ZeroMaxAttempts,
    ZeroWindow,
    ZeroLockout,
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::ZeroMaxAttempts => write!(f, "max_attempts must be greater than 0"),
            PolicyError::ZeroWindow => write!(f, "window must be a non-zero duration"),
            PolicyError::ZeroLockout => write!(f, "lockout must be a non-zero duration"),
        }
    }
}

impl std::error::Error for PolicyError {}
