//! Cleanup sweep
//!
//! Recurring background task that purges stale attempt records so the
//! tables stay bounded. The sweep only removes entries whose window and
//! lock have both run out; it never touches a live decision.

use log::debug;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

use crate::limiter::core::RateLimiter;

/// Handle to a running cleanup sweep.
///
/// Stopping the handle (or dropping it) cancels the task, so shutdown
/// and test teardown never leave a dangling timer behind.
pub struct SweepHandle {
    task: JoinHandle<()>,
}

impl SweepHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Whether the background task has terminated
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a recurring sweep over the given tables, one pass every `every`.
/// Must be called from within a tokio runtime.
pub fn start_cleanup_sweep(limiters: Vec<RateLimiter>, every: Duration) -> SweepHandle {
    let task = tokio::spawn(async move {
        let mut ticker = time::interval(every);
        // the first tick completes immediately; consume it so the first
        // real pass lands one full interval from now
        ticker.tick().await;
        loop {
            ticker.tick().await;
            for limiter in &limiters {
                let removed = limiter.sweep_expired();
                if removed > 0 {
                    debug!("Sweep removed {} stale attempt records", removed);
                }
            }
        }
    });

    SweepHandle { task }
}
