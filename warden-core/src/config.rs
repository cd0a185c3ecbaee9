//! Configuration for lockout, session and reset token policies.
//!
//! Every struct has a [`Default`] matching the stock policy (5 attempts, 15 minute
//! lockout, 24 hour sessions, 1 hour reset tokens) and chainable setters.
//! [`WardenConfig::from_env`] overlays `WARDEN_*` environment variables on the defaults.

use chrono::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOCKOUT_MINUTES: i64 = 15;
pub const DEFAULT_SESSION_TIMEOUT_HOURS: i64 = 24;
pub const DEFAULT_RESET_TOKEN_TTL_HOURS: i64 = 1;
pub const DEFAULT_CLEANUP_INTERVAL_HOURS: i64 = 1;
/// Upper bound on every configured duration, roughly 100 years
pub const MAX_DURATION_DAYS: i64 = 36_525;

fn check_duration(name: &str, duration: Duration) -> Result<(), ConfigError> {
    if duration <= Duration::zero() {
        return Err(ConfigError::Invalid(format!("{name} must be positive")));
    }
    if duration > Duration::days(MAX_DURATION_DAYS) {
        return Err(ConfigError::Invalid(format!(
            "{name} must not exceed {MAX_DURATION_DAYS} days"
        )));
    }
    Ok(())
}

/// Account lockout policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutConfig {
    /// When false, nothing is recorded and every account reports unlocked
    pub enabled: bool,
    /// Consecutive failures that trigger a lock
    pub max_failed_attempts: u32,
    /// How long a lock lasts once triggered
    pub lockout_duration: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            lockout_duration: Duration::minutes(DEFAULT_LOCKOUT_MINUTES),
        }
    }
}

impl LockoutConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn max_failed_attempts(mut self, max: u32) -> Self {
        self.max_failed_attempts = max;
        self
    }

    pub fn lockout_duration(mut self, duration: Duration) -> Self {
        self.lockout_duration = duration;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_failed_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_failed_attempts must be at least 1".to_string(),
            ));
        }
        check_duration("lockout_duration", self.lockout_duration)
    }
}

/// Session expiry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::hours(DEFAULT_SESSION_TIMEOUT_HOURS),
        }
    }
}

impl SessionConfig {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Password reset token policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenConfig {
    pub ttl: Duration,
}

impl Default for ResetTokenConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(DEFAULT_RESET_TOKEN_TTL_HOURS),
        }
    }
}

impl ResetTokenConfig {
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Top-level configuration consumed by the `warden` facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WardenConfig {
    pub lockout: LockoutConfig,
    pub session: SessionConfig,
    pub reset_token: ResetTokenConfig,
    /// Period of the background purge of expired locks and reset tokens
    pub cleanup_interval: Duration,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            lockout: LockoutConfig::default(),
            session: SessionConfig::default(),
            reset_token: ResetTokenConfig::default(),
            cleanup_interval: Duration::hours(DEFAULT_CLEANUP_INTERVAL_HOURS),
        }
    }
}

impl WardenConfig {
    /// Build a configuration from `WARDEN_*` environment variables.
    ///
    /// | variable | meaning |
    /// | --- | --- |
    /// | `WARDEN_LOCKOUT_ENABLED` | `true` / `false` |
    /// | `WARDEN_MAX_FAILED_ATTEMPTS` | failures before lock |
    /// | `WARDEN_LOCKOUT_SECONDS` | lock duration |
    /// | `WARDEN_SESSION_TIMEOUT_SECONDS` | session lifetime |
    /// | `WARDEN_RESET_TOKEN_TTL_SECONDS` | reset token lifetime |
    /// | `WARDEN_CLEANUP_INTERVAL_SECONDS` | background purge period |
    ///
    /// Unset variables keep their default. Unparseable values are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`WardenConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(enabled) = parse_var::<bool>(&lookup, "WARDEN_LOCKOUT_ENABLED")? {
            config.lockout.enabled = enabled;
        }
        if let Some(max) = parse_var::<u32>(&lookup, "WARDEN_MAX_FAILED_ATTEMPTS")? {
            config.lockout.max_failed_attempts = max;
        }
        if let Some(duration) = parse_seconds(&lookup, "WARDEN_LOCKOUT_SECONDS")? {
            config.lockout.lockout_duration = duration;
        }
        if let Some(duration) = parse_seconds(&lookup, "WARDEN_SESSION_TIMEOUT_SECONDS")? {
            config.session.timeout = duration;
        }
        if let Some(duration) = parse_seconds(&lookup, "WARDEN_RESET_TOKEN_TTL_SECONDS")? {
            config.reset_token.ttl = duration;
        }
        if let Some(duration) = parse_seconds(&lookup, "WARDEN_CLEANUP_INTERVAL_SECONDS")? {
            config.cleanup_interval = duration;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lockout.validate()?;
        check_duration("session timeout", self.session.timeout)?;
        check_duration("reset token ttl", self.reset_token.ttl)?;
        check_duration("cleanup interval", self.cleanup_interval)
    }

    pub fn with_lockout(mut self, lockout: LockoutConfig) -> Self {
        self.lockout = lockout;
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_reset_token(mut self, reset_token: ResetTokenConfig) -> Self {
        self.reset_token = reset_token;
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}

fn parse_seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(secs) = parse_var::<i64>(lookup, key)? else {
        return Ok(None);
    };
    Duration::try_seconds(secs)
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            value: secs.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = WardenConfig::default();
        assert!(config.lockout.enabled);
        assert_eq!(config.lockout.max_failed_attempts, 5);
        assert_eq!(config.lockout.lockout_duration, Duration::minutes(15));
        assert_eq!(config.session.timeout, Duration::hours(24));
        assert_eq!(config.reset_token.ttl, Duration::hours(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = WardenConfig::from_lookup(lookup_from(&[
            ("WARDEN_MAX_FAILED_ATTEMPTS", "3"),
            ("WARDEN_LOCKOUT_SECONDS", "60"),
            ("WARDEN_LOCKOUT_ENABLED", "false"),
            ("WARDEN_RESET_TOKEN_TTL_SECONDS", "1800"),
        ]))
        .unwrap();

        assert!(!config.lockout.enabled);
        assert_eq!(config.lockout.max_failed_attempts, 3);
        assert_eq!(config.lockout.lockout_duration, Duration::seconds(60));
        assert_eq!(config.reset_token.ttl, Duration::minutes(30));
        assert_eq!(config.session.timeout, Duration::hours(24));
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err =
            WardenConfig::from_lookup(lookup_from(&[("WARDEN_MAX_FAILED_ATTEMPTS", "many")]))
                .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key, .. } if key == "WARDEN_MAX_FAILED_ATTEMPTS"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config =
            WardenConfig::default().with_lockout(LockoutConfig::default().max_failed_attempts(0));
        assert!(config.validate().is_err());

        let err =
            WardenConfig::from_lookup(lookup_from(&[("WARDEN_SESSION_TIMEOUT_SECONDS", "0")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_lookup_rejects_out_of_range_seconds() {
        let err = WardenConfig::from_lookup(lookup_from(&[(
            "WARDEN_SESSION_TIMEOUT_SECONDS",
            "9223372036854775807",
        )]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key, .. } if key == "WARDEN_SESSION_TIMEOUT_SECONDS"
        ));
    }

    #[test]
    fn test_validate_rejects_durations_over_a_century() {
        let err = WardenConfig::from_lookup(lookup_from(&[(
            "WARDEN_LOCKOUT_SECONDS",
            "9000000000000",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let too_long = Duration::days(MAX_DURATION_DAYS + 1);
        assert!(LockoutConfig::default().lockout_duration(too_long).validate().is_err());
        assert!(
            WardenConfig::default()
                .with_reset_token(ResetTokenConfig::default().ttl(too_long))
                .validate()
                .is_err()
        );
        assert!(
            WardenConfig::default()
                .with_session(SessionConfig::default().timeout(Duration::days(MAX_DURATION_DAYS)))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_disabled_keeps_limits() {
        let config = LockoutConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.max_failed_attempts, DEFAULT_MAX_FAILED_ATTEMPTS);
    }
}
