//! Core rate limiter
//!
//! Tracks failed attempts per identity inside a rolling window and
//! enforces a temporary lockout once the threshold is reached. Checking
//! and recording are separate operations: a check never consumes an
//! attempt, so gating a request and reporting its outcome do not
//! double-count.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::PolicyError;
use crate::limiter::policy::RateLimitPolicy;
use crate::limiter::record::AttemptRecord;
use crate::limiter::results::RateLimitDecision;
use crate::limiter::sweep::{self, SweepHandle};

/// Attempt-tracking rate limiter keyed by caller-normalized identity
/// strings (client IP as-is, emails lowercased and trimmed).
///
/// Cloning yields another handle to the same table; the cleanup sweep
/// holds one. Independently constructed limiters never share state.
/// Blank identities are never tracked: checks on them pass and records
/// are dropped, since an absent identity cannot be meaningfully limited.
#[derive(Clone)]
pub struct RateLimiter {
    records: Arc<Mutex<HashMap<String, AttemptRecord>>>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            policy,
        })
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Decide whether an attempt for `key` may proceed. Does not count
    /// an attempt; pair with `record_failure`/`record_success` once the
    /// outcome is known.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        if key.trim().is_empty() {
            debug!("Check against blank identity, allowing");
            return RateLimitDecision::allowed();
        }

        let mut records = self.lock();
        let Some(record) = records.get_mut(key) else {
            return RateLimitDecision::allowed();
        };

        // The lock is independent of the window and always wins
        if let Some(until) = record.locked_until {
            if now < until {
                return RateLimitDecision::limited(until.duration_since(now));
            }
        }

        if !record.window_expired(now, self.policy.window) {
            if record.failures >= self.policy.max_attempts {
                // Threshold reached inside a live window with no active
                // lock (either the lock expired early or was never set)
                record.locked_until = Some(now + self.policy.lockout);
                warn!(
                    "Identity {} locked out for {}s ({} failures in window)",
                    key,
                    self.policy.lockout.as_secs(),
                    record.failures
                );
                return RateLimitDecision::limited(self.policy.lockout);
            }
            return RateLimitDecision::allowed();
        }

        // Window ran out with no active lock, drop the stale entry now
        // instead of waiting for the sweep
        records.remove(key);
        RateLimitDecision::allowed()
    }

    /// Count a failed attempt for `key`, locking the identity out once
    /// the threshold is reached.
    pub fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now());
    }

    fn record_failure_at(&self, key: &str, now: Instant) {
        if key.trim().is_empty() {
            debug!("Failure against blank identity, ignoring");
            return;
        }

        let mut records = self.lock();
        let record = records
            .entry(key.to_string())
            .or_insert_with(|| AttemptRecord::new(now));

        // A stale window restarts from scratch; an active lock keeps the
        // record alive so a failure can never clear a lockout
        if record.is_stale(now, self.policy.window) {
            *record = AttemptRecord::new(now);
        }

        record.failures = record.failures.saturating_add(1);
        if record.failures >= self.policy.max_attempts {
            record.locked_until = Some(now + self.policy.lockout);
            if record.failures == self.policy.max_attempts {
                warn!(
                    "Identity {} locked out for {}s after {} failures",
                    key,
                    self.policy.lockout.as_secs(),
                    record.failures
                );
            } else {
                debug!("Lockout extended for identity {}", key);
            }
        } else {
            debug!(
                "Identity {} at {}/{} failures",
                key, record.failures, self.policy.max_attempts
            );
        }
    }

    /// Forget all attempt history for `key`. Idempotent.
    pub fn record_success(&self, key: &str) {
        if key.trim().is_empty() {
            return;
        }
        if self.lock().remove(key).is_some() {
            debug!("Cleared attempt history for identity {}", key);
        }
    }

    /// Remove every record whose window and lock have both run out.
    /// Returns the number of records removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|_, record| !record.is_stale(now, self.policy.window));
        before - records.len()
    }

    /// Spawn a recurring sweep over this table
    pub fn start_cleanup_sweep(&self, every: Duration) -> SweepHandle {
        sweep::start_cleanup_sweep(vec![self.clone()], every)
    }

    /// Clear the whole table (test teardown)
    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Number of identities currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, AttemptRecord>> {
        // Keep limiting even if another thread panicked mid-update
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}
