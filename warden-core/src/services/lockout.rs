//! Account lockout service.
//!
//! Tracks consecutive failed logins per account and locks the account once the
//! configured limit is reached. The lock lifts by itself after the lockout
//! duration; the next status check then deletes the record so counting starts
//! over.
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_core::services::LockoutService;
//! use warden_core::config::LockoutConfig;
//!
//! let service = LockoutService::new(repository, LockoutConfig::default());
//!
//! // Before verifying credentials
//! let status = service.check_status("user@example.com", Utc::now()).await?;
//! if status.is_locked {
//!     // tell the user to retry in status.remaining_minutes
//! }
//!
//! // After verifying credentials
//! if ok {
//!     service.clear_on_success("user@example.com").await?;
//! } else {
//!     let outcome = service.record_failure("user@example.com", Utc::now()).await?;
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Error,
    config::LockoutConfig,
    policy::{LockoutPolicy, RecordAction},
    repositories::AttemptRepository,
    storage::{FailureOutcome, LockoutStatus},
    sync::KeyedLocks,
    validation::{mask_email, normalize_email},
};

/// Service for checking and updating account lockout state.
///
/// Identifiers are trimmed and lowercased before use. Every operation that reads
/// and then writes a record holds a per-identifier lock for the whole cycle, so
/// concurrent failures for one account are never under-counted.
///
/// A storage error is always returned to the caller. It is never interpreted as
/// "not locked".
pub struct LockoutService<R: AttemptRepository> {
    repository: Arc<R>,
    policy: LockoutPolicy,
    locks: KeyedLocks,
}

impl<R: AttemptRepository> LockoutService<R> {
    pub fn new(repository: Arc<R>, config: LockoutConfig) -> Self {
        Self {
            repository,
            policy: LockoutPolicy::new(config),
            locks: KeyedLocks::default(),
        }
    }

    pub fn config(&self) -> &LockoutConfig {
        self.policy.config()
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    pub fn is_enabled(&self) -> bool {
        self.config().enabled
    }

    /// Report whether authentication may proceed for `identifier` at `now`.
    ///
    /// If the account's lock has expired, the attempt record is deleted as part of
    /// the check.
    pub async fn check_status(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<LockoutStatus, Error> {
        let identifier = normalize_email(identifier);

        if !self.is_enabled() {
            return Ok(LockoutStatus::unlocked(
                identifier,
                self.config().max_failed_attempts,
            ));
        }

        let _guard = self.locks.lock(&identifier).await;
        let record = self.repository.get(&identifier).await?;
        let decision = self
            .policy
            .evaluate_status(&identifier, record.as_ref(), now);

        if decision.action == RecordAction::Delete {
            tracing::debug!(
                identifier = %mask_email(&identifier),
                "Lockout expired, clearing attempt record"
            );
        }
        self.apply(&identifier, &decision.action).await?;

        Ok(decision.status)
    }

    /// Convenience wrapper around [`LockoutService::check_status`].
    pub async fn is_locked(&self, identifier: &str, now: DateTime<Utc>) -> Result<bool, Error> {
        Ok(self.check_status(identifier, now).await?.is_locked)
    }

    /// Record one failed authentication attempt.
    ///
    /// Reaching the configured maximum locks the account until
    /// `now + lockout_duration`.
    pub async fn record_failure(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<FailureOutcome, Error> {
        let identifier = normalize_email(identifier);

        let _guard = self.locks.lock(&identifier).await;
        let record = if self.is_enabled() {
            self.repository.get(&identifier).await?
        } else {
            None
        };

        let decision = self.policy.evaluate_failure(&identifier, record, now);
        self.apply(&identifier, &decision.action).await?;

        let outcome = decision.outcome;
        if outcome.is_locked {
            tracing::info!(
                identifier = %mask_email(&identifier),
                attempts = outcome.attempts,
                locked_until = ?outcome.locked_until,
                "Account locked after repeated failed logins"
            );
        } else if self.is_enabled() {
            tracing::debug!(
                identifier = %mask_email(&identifier),
                attempts = outcome.attempts,
                remaining = outcome.remaining_attempts,
                "Recorded failed login attempt"
            );
        }

        Ok(outcome)
    }

    /// Forget all failed attempts for `identifier` after a successful login.
    ///
    /// Safe to call when no record exists.
    pub async fn clear_on_success(&self, identifier: &str) -> Result<(), Error> {
        let identifier = normalize_email(identifier);
        let _guard = self.locks.lock(&identifier).await;
        self.repository.delete(&identifier).await
    }

    /// Lift any lock on `identifier`, e.g. after a completed password reset.
    ///
    /// Returns `true` if the account was locked at `now`.
    pub async fn unlock(&self, identifier: &str, now: DateTime<Utc>) -> Result<bool, Error> {
        let identifier = normalize_email(identifier);
        let _guard = self.locks.lock(&identifier).await;

        let was_locked = self
            .repository
            .get(&identifier)
            .await?
            .is_some_and(|record| record.is_locked_at(now));
        self.repository.delete(&identifier).await?;

        if was_locked {
            tracing::info!(identifier = %mask_email(&identifier), "Account unlocked");
        }
        Ok(was_locked)
    }

    /// Delete every record whose lock has run out. Returns the number removed.
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        self.repository.cleanup_expired(now).await
    }

    /// Write a [`RecordAction`] produced by the policy to the store.
    ///
    /// Callers driving the policy themselves must hold their own serialization
    /// around the evaluate/apply pair.
    pub async fn apply(&self, identifier: &str, action: &RecordAction) -> Result<(), Error> {
        match action {
            RecordAction::Keep => Ok(()),
            RecordAction::Put(record) => self.repository.put(record).await,
            RecordAction::Delete => self.repository.delete(identifier).await,
        }
    }
}
