//! Configuration management
//!
//! Loads throttle thresholds from an optional `throttle.toml` with
//! `THROTTLE`-prefixed environment overrides. Every duration is a
//! plain seconds field in the file and exposed as a `Duration` here.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::limiter::RateLimitPolicy;

/// Complete throttle configuration, one section per attempt table
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Login attempt thresholds (keyed by client IP or normalized email)
    pub login: LimitSettings,

    /// Public form submission thresholds
    pub submit: LimitSettings,

    /// Seconds between cleanup sweep passes
    pub cleanup_interval_secs: u64,
}

/// Thresholds for a single attempt table
#[derive(Debug, Deserialize, Clone)]
pub struct LimitSettings {
    /// Failure count at which the lockout engages
    pub max_attempts: u32,

    /// Rolling window during which failures accumulate
    pub window_secs: u64,

    /// How long an identity stays blocked once locked
    pub lockout_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            login: LimitSettings {
                max_attempts: 10,
                window_secs: 15 * 60,
                lockout_secs: 15 * 60,
            },
            submit: LimitSettings {
                max_attempts: 20,
                window_secs: 60,
                lockout_secs: 5 * 60,
            },
            cleanup_interval_secs: 5 * 60,
        }
    }
}

impl ThrottleConfig {
    /// Load configuration from throttle.toml (when present) with
    /// environment overrides, falling back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("throttle").required(false))
            .add_source(Environment::with_prefix("THROTTLE").separator("__"))
            .build()?;

        let config: ThrottleConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.login.validate("login")?;
        self.submit.validate("submit")?;

        if self.cleanup_interval_secs == 0 {
            return Err(ConfigError::Message(
                "cleanup_interval_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn login_policy(&self) -> RateLimitPolicy {
        self.login.policy()
    }

    pub fn submit_policy(&self) -> RateLimitPolicy {
        self.submit.policy()
    }

    /// Sweep cadence as a Duration
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl LimitSettings {
    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Message(format!(
                "{}.max_attempts must be greater than 0",
                section
            )));
        }

        if self.window_secs == 0 {
            return Err(ConfigError::Message(format!(
                "{}.window_secs must be greater than 0",
                section
            )));
        }

        if self.lockout_secs == 0 {
            return Err(ConfigError::Message(format!(
                "{}.lockout_secs must be greater than 0",
                section
            )));
        }

        Ok(())
    }

    fn policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(
            self.max_attempts,
            Duration::from_secs(self.window_secs),
            Duration::from_secs(self.lockout_secs),
        )
    }
}
