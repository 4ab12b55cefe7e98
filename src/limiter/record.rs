//! Attempt records
//!
//! Per-identity failure state tracked by the limiter.

use std::time::{Duration, Instant};

/// Failure history for one tracked identity
#[derive(Debug, Clone)]
pub(crate) struct AttemptRecord {
    /// Consecutive recorded failures since the last success or window reset
    pub failures: u32,

    /// When the current counting window began
    pub window_start: Instant,

    /// When set and in the future, the identity is blocked regardless of count
    pub locked_until: Option<Instant>,
}

impl AttemptRecord {
    /// Fresh record opening a new counting window
    pub fn new(now: Instant) -> Self {
        Self {
            failures: 0,
            window_start: now,
            locked_until: None,
        }
    }

    pub fn window_expired(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.window_start) >= window
    }

    pub fn is_locked(&self, now: Instant) -> bool {
        match self.locked_until {
            Some(until) => now < until,
            None => false,
        }
    }

    /// Purge eligibility: the window has run out and no lock is active
    pub fn is_stale(&self, now: Instant, window: Duration) -> bool {
        self.window_expired(now, window) && !self.is_locked(now)
    }
}
