//! Password reset token service.
//!
//! Each identifier has at most one active reset token. Issuing a new one replaces
//! the previous token, so only the most recent link a user received works. Tokens
//! are stored as SHA-256 digests and compared in constant time.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use crate::{
    Error,
    clock::deadline_after,
    config::ResetTokenConfig,
    crypto::{generate_secure_token, hash_token, verify_token_hash},
    repositories::ResetTokenRepository,
    storage::ResetToken,
    sync::KeyedLocks,
    validation::{mask_email, normalize_email},
};

pub struct ResetTokenService<R: ResetTokenRepository> {
    repository: Arc<R>,
    config: ResetTokenConfig,
    locks: KeyedLocks,
}

impl<R: ResetTokenRepository> ResetTokenService<R> {
    pub fn new(repository: Arc<R>, config: ResetTokenConfig) -> Self {
        Self {
            repository,
            config,
            locks: KeyedLocks::default(),
        }
    }

    pub fn config(&self) -> &ResetTokenConfig {
        &self.config
    }

    /// Issue a reset token for `identifier`, replacing any earlier one.
    ///
    /// The returned plaintext is the only copy; deliver it out-of-band.
    pub async fn issue_reset_token(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<String, Error> {
        let identifier = normalize_email(identifier);
        let token = generate_secure_token()?;

        let record = ResetToken {
            identifier: identifier.clone(),
            token_hash: hash_token(&token),
            expires_at: deadline_after(now, self.config.ttl),
            created_at: now.trunc_subsecs(3),
        };

        let _guard = self.locks.lock(&identifier).await;
        self.repository.put(&record).await?;

        tracing::info!(
            identifier = %mask_email(&identifier),
            expires_at = %record.expires_at,
            "Issued password reset token"
        );

        Ok(token)
    }

    /// Check `token` against the active reset token for `identifier` at `now`.
    ///
    /// Returns `false` when there is no token, when it does not match, or when it
    /// has expired. An expired token is deleted as part of the check.
    pub async fn validate_reset_token(
        &self,
        identifier: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let identifier = normalize_email(identifier);
        if token.is_empty() {
            return Ok(false);
        }

        let _guard = self.locks.lock(&identifier).await;
        let Some(stored) = self.repository.get(&identifier).await? else {
            return Ok(false);
        };

        if stored.is_expired_at(now) {
            tracing::debug!(
                identifier = %mask_email(&identifier),
                "Reset token expired, removing it"
            );
            self.repository.delete(&identifier).await?;
            return Ok(false);
        }

        let valid = verify_token_hash(token, &stored.token_hash);
        if !valid {
            tracing::warn!(
                identifier = %mask_email(&identifier),
                "Rejected reset token that does not match the active token"
            );
        }
        Ok(valid)
    }

    /// Remove the reset token for `identifier`. Safe to call when none exists.
    pub async fn clear_reset_token(&self, identifier: &str) -> Result<(), Error> {
        let identifier = normalize_email(identifier);
        let _guard = self.locks.lock(&identifier).await;
        self.repository.delete(&identifier).await
    }

    /// Delete every expired token. Returns the number removed.
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        self.repository.cleanup_expired(now).await
    }
}
