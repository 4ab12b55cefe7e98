//! Limiter policy
//!
//! Defines the per-table thresholds: how many failures fit in a window
//! and how long an identity stays locked once the threshold is reached.

use std::time::Duration;

use crate::error::PolicyError;

/// Thresholds for a single attempt table
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Failure count at which the lockout engages
    pub max_attempts: u32,

    /// Rolling window during which failures accumulate
    pub window: Duration,

    /// How long an identity stays blocked after reaching the threshold
    pub lockout: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            window: Duration::from_secs(15 * 60),
            lockout: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitPolicy {
    pub fn new(max_attempts: u32, window: Duration, lockout: Duration) -> Self {
        Self {
            max_attempts,
            window,
            lockout,
        }
    }

    /// Reject zero values, which would lock everyone out or never anyone
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_attempts == 0 {
            return Err(PolicyError::ZeroMaxAttempts);
        }
        if self.window.is_zero() {
            return Err(PolicyError::ZeroWindow);
        }
        if self.lockout.is_zero() {
            return Err(PolicyError::ZeroLockout);
        }
        Ok(())
    }
}
