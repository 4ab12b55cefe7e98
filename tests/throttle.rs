use std::time::Duration;

use coupon_throttle::guard::keys::normalize_email;
use coupon_throttle::{RateLimitPolicy, RateLimiter, Throttle, ThrottleConfig};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn default_throttle() -> Throttle {
    Throttle::new(&ThrottleConfig::default()).unwrap()
}

#[test]
fn test_unknown_identity_is_allowed() {
    init_logging();
    let throttle = default_throttle();
    let decision = throttle.check_login_rate_limit("203.0.113.7");
    assert!(decision.allowed);
    assert!(decision.retry_after.is_none());
}

#[test]
fn test_ten_failures_lock_the_ip_out() {
    init_logging();
    let throttle = default_throttle();
    for _ in 0..10 {
        throttle.record_login_failure("192.168.1.4");
    }
    let decision = throttle.check_login_rate_limit("192.168.1.4");
    assert!(!decision.allowed);
    assert!(decision.retry_after.unwrap() > Duration::ZERO);
    assert!(decision.retry_after_secs().unwrap() > 0);
}

#[test]
fn test_five_failures_stay_under_the_threshold() {
    init_logging();
    let throttle = default_throttle();
    for _ in 0..5 {
        throttle.record_login_failure("192.168.1.2");
    }
    assert!(throttle.check_login_rate_limit("192.168.1.2").allowed);
}

#[test]
fn test_success_clears_earlier_failures() {
    init_logging();
    let throttle = default_throttle();
    throttle.record_login_failure("192.168.1.3");
    throttle.record_login_failure("192.168.1.3");
    throttle.record_login_success("192.168.1.3");
    assert!(throttle.check_login_rate_limit("192.168.1.3").allowed);
}

#[test]
fn test_success_without_history_is_harmless() {
    init_logging();
    let throttle = default_throttle();
    throttle.record_login_success("192.168.1.200");
    assert!(throttle.check_login_rate_limit("192.168.1.200").allowed);
}

#[test]
fn test_one_locked_ip_does_not_affect_another() {
    init_logging();
    let throttle = default_throttle();
    for _ in 0..10 {
        throttle.record_login_failure("192.168.1.4");
    }
    assert!(!throttle.check_login_rate_limit("192.168.1.4").allowed);
    assert!(throttle.check_login_rate_limit("192.168.1.5").allowed);
}

#[test]
fn test_blank_identity_fails_open() {
    init_logging();
    let throttle = default_throttle();
    throttle.record_login_failure("");
    assert!(throttle.check_login_rate_limit("").allowed);
}

// Distributed guessing of one account from many IPs: the caller runs an
// email-keyed limiter next to the IP-keyed one, and an attempt passes
// only when both agree.
#[test]
fn test_email_keyed_variant_runs_alongside_ip_keying() {
    init_logging();
    let throttle = default_throttle();
    let by_email = RateLimiter::new(RateLimitPolicy::default()).unwrap();
    let email = normalize_email("  Alice@Example.COM ");
    assert_eq!(email, "alice@example.com");

    for attacker in 0..10 {
        let ip = format!("198.51.100.{}", attacker);
        assert!(throttle.check_login_rate_limit(&ip).allowed);
        assert!(by_email.check(&email).allowed);
        throttle.record_login_failure(&ip);
        by_email.record_failure(&email);
    }

    // Every IP is still under its own threshold, but the account is not
    assert!(throttle.check_login_rate_limit("198.51.100.3").allowed);
    assert!(!by_email.check("alice@example.com").allowed);
}

#[tokio::test]
async fn test_sweep_purges_expired_records_and_restarts_the_window() {
    init_logging();
    let limiter = RateLimiter::new(RateLimitPolicy::new(
        3,
        Duration::from_millis(50),
        Duration::from_millis(50),
    ))
    .unwrap();

    for _ in 0..3 {
        limiter.record_failure("10.0.0.9");
    }
    assert!(!limiter.check("10.0.0.9").allowed);
    assert_eq!(limiter.tracked_keys(), 1);

    let handle = limiter.start_cleanup_sweep(Duration::from_millis(25));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(limiter.tracked_keys(), 0);

    // A new round of failures opens a fresh window instead of resuming
    // the stale count
    limiter.record_failure("10.0.0.9");
    limiter.record_failure("10.0.0.9");
    assert!(limiter.check("10.0.0.9").allowed);

    handle.stop();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(handle.is_finished());
}

#[tokio::test]
async fn test_throttle_cleanup_interval_covers_both_tables() {
    init_logging();
    let mut config = ThrottleConfig::default();
    config.login.window_secs = 1;
    config.login.lockout_secs = 1;
    config.submit.max_attempts = 3;
    config.submit.window_secs = 1;
    config.submit.lockout_secs = 1;
    config.cleanup_interval_secs = 1;
    let throttle = Throttle::new(&config).unwrap();

    for _ in 0..9 {
        throttle.record_login_failure("192.0.2.1");
    }
    for _ in 0..3 {
        assert!(throttle.check_submit_rate_limit("192.0.2.1").allowed);
    }
    assert!(!throttle.check_submit_rate_limit("192.0.2.1").allowed);

    let _handle = throttle.start_cleanup_interval();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    // Both tables restarted from scratch: one more login failure sits at
    // count 1 rather than tripping the threshold, and submissions have a
    // full window again
    throttle.record_login_failure("192.0.2.1");
    assert!(throttle.check_login_rate_limit("192.0.2.1").allowed);
    for _ in 0..3 {
        assert!(throttle.check_submit_rate_limit("192.0.2.1").allowed);
    }
}
