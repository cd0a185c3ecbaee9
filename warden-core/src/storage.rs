//! Persisted records and the values reported back to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-account failure counter and optional lock expiry.
///
/// `locked_until` is only ever set once `attempt_count` has reached the configured
/// maximum. The record is deleted on a successful login and when its lock expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub identifier: String,
    pub attempt_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl AttemptRecord {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            attempt_count: 0,
            locked_until: None,
        }
    }

    /// True while the lock is still in force at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// True once a lock was set and has run out at `now`.
    pub fn lock_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now >= until)
    }
}

/// The single active password reset token for an identifier.
///
/// Only the SHA-256 digest of the token is kept; the plaintext goes back to the
/// caller exactly once when the token is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetToken {
    pub identifier: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// An opaque bearer token for an authenticated session.
///
/// Sessions are not stored server-side; validity is a pure timestamp comparison.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

// Keep the bearer value out of logs
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Lockout state of an account as reported by a status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutStatus {
    pub identifier: String,
    pub failed_attempts: u32,
    pub remaining_attempts: u32,
    pub is_locked: bool,
    pub locked_until: Option<DateTime<Utc>>,
    /// Whole minutes left on the lock, rounded up. Zero when unlocked.
    pub remaining_minutes: i64,
}

impl LockoutStatus {
    pub fn unlocked(identifier: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            identifier: identifier.into(),
            failed_attempts: 0,
            remaining_attempts: max_attempts,
            is_locked: false,
            locked_until: None,
            remaining_minutes: 0,
        }
    }

    /// Seconds until the lock lifts, suitable for a `Retry-After` header.
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.locked_until
            .filter(|_| self.is_locked)
            .map(|until| (until - now).num_seconds().max(0))
    }
}

/// Result of recording one failed authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureOutcome {
    pub identifier: String,
    pub is_locked: bool,
    pub attempts: u32,
    pub remaining_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_attempt_record_lock_predicates() {
        let mut record = AttemptRecord::new("a@b.com");
        assert!(!record.is_locked_at(t0()));
        assert!(!record.lock_expired_at(t0()));

        record.locked_until = Some(t0() + Duration::minutes(15));
        assert!(record.is_locked_at(t0()));
        assert!(!record.lock_expired_at(t0()));

        let at_boundary = t0() + Duration::minutes(15);
        assert!(!record.is_locked_at(at_boundary));
        assert!(record.lock_expired_at(at_boundary));
    }

    #[test]
    fn test_reset_token_expiry_is_inclusive() {
        let token = ResetToken {
            identifier: "a@b.com".to_string(),
            token_hash: "00".to_string(),
            expires_at: t0() + Duration::hours(1),
            created_at: t0(),
        };
        assert!(!token.is_expired_at(t0() + Duration::hours(1)));
        assert!(token.is_expired_at(t0() + Duration::hours(1) + Duration::milliseconds(1)));
    }

    #[test]
    fn test_session_token_debug_is_redacted() {
        let token = SessionToken {
            value: "super-secret".to_string(),
            issued_at: t0(),
            expires_at: t0() + Duration::hours(24),
        };
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!token.is_expired_at(t0() + Duration::hours(24)));
        assert!(token.is_expired_at(t0() + Duration::hours(25)));
    }

    #[test]
    fn test_retry_after_seconds() {
        let status = LockoutStatus {
            identifier: "a@b.com".to_string(),
            failed_attempts: 5,
            remaining_attempts: 0,
            is_locked: true,
            locked_until: Some(t0() + Duration::minutes(15)),
            remaining_minutes: 15,
        };
        assert_eq!(status.retry_after_seconds(t0()), Some(900));
        assert_eq!(
            LockoutStatus::unlocked("a@b.com", 5).retry_after_seconds(t0()),
            None
        );
    }

    #[test]
    fn test_attempt_record_json_layout() {
        let record = AttemptRecord {
            identifier: "a@b.com".to_string(),
            attempt_count: 2,
            locked_until: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["attempt_count"], 2);
        assert!(json["locked_until"].is_null());
    }
}
