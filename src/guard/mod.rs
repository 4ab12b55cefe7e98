//! Consumer-facing throttle surface
//!
//! Maps the login and submission entry points used by the HTTP layer
//! onto two independent attempt tables. An identity blocked for logins
//! is not automatically blocked for submissions, and vice versa.

pub mod keys;

use std::time::Duration;

use crate::config::ThrottleConfig;
use crate::error::PolicyError;
use crate::limiter::{RateLimitDecision, RateLimiter, SweepHandle, start_cleanup_sweep};

/// Login and submission throttling for the web layer.
///
/// Construct one at process startup and share it with every handler.
/// For the email-keyed login variant (catching distributed guessing of
/// one account from many IPs), run a second `RateLimiter` alongside and
/// key it with `keys::normalize_email`; the two tables stay independent.
pub struct Throttle {
    login: RateLimiter,
    submit: RateLimiter,
    cleanup_interval: Duration,
}

impl Throttle {
    pub fn new(config: &ThrottleConfig) -> Result<Self, PolicyError> {
        Ok(Self {
            login: RateLimiter::new(config.login_policy())?,
            submit: RateLimiter::new(config.submit_policy())?,
            cleanup_interval: config.cleanup_interval(),
        })
    }

    /// Gate a login attempt for `identity` before checking credentials.
    /// Does not count an attempt; report the outcome afterwards with
    /// `record_login_failure` or `record_login_success`.
    pub fn check_login_rate_limit(&self, identity: &str) -> RateLimitDecision {
        self.login.check(identity)
    }

    pub fn record_login_failure(&self, identity: &str) {
        self.login.record_failure(identity);
    }

    pub fn record_login_success(&self, identity: &str) {
        self.login.record_success(identity);
    }

    /// Gate a public form submission for `identity`. Every allowed
    /// submission counts toward the window, so the decision and the
    /// bookkeeping happen in one call; once the threshold is hit,
    /// further submissions are denied until the lockout expires.
    pub fn check_submit_rate_limit(&self, identity: &str) -> RateLimitDecision {
        let decision = self.submit.check(identity);
        if decision.allowed {
            self.submit.record_failure(identity);
        }
        decision
    }

    /// Start the recurring cleanup sweep over both tables. Call once at
    /// process startup and keep the handle alive while serving traffic;
    /// stopping or dropping it cancels the sweep.
    pub fn start_cleanup_interval(&self) -> SweepHandle {
        start_cleanup_sweep(
            vec![self.login.clone(), self.submit.clone()],
            self.cleanup_interval,
        )
    }

    /// Clear both tables (test teardown)
    pub fn reset(&self) {
        self.login.reset();
        self.submit.reset();
    }
}
