//! Result types for limiter operations

use std::time::Duration;

/// Outcome of a rate limit check
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub retry_after: Option<Duration>,
}

impl RateLimitDecision {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after: None,
        }
    }

    pub fn limited(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after: Some(retry_after),
        }
    }

    /// Remaining wait in whole seconds, rounded up, for Retry-After responses
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after
            .map(|d| d.as_secs() + if d.subsec_nanos() > 0 { 1 } else { 0 })
    }
}
