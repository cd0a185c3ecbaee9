use chrono::{DateTime, Utc};

use crate::{Error, config::SessionConfig, crypto::generate_secure_token, storage::SessionToken};

/// Issues bearer tokens and checks their age
///
/// Sessions are stateless: nothing is stored and there is no revocation list.
/// A token is valid while it is non-empty and no older than the configured timeout.
#[derive(Debug, Clone, Default)]
pub struct SessionTokenService {
    config: SessionConfig,
}

impl SessionTokenService {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Issue a fresh random bearer token at `now`
    pub fn issue_session_token(&self, now: DateTime<Utc>) -> Result<SessionToken, Error> {
        Ok(SessionToken {
            value: generate_secure_token()?,
            issued_at: now,
            expires_at: self.session_expires_at(now),
        })
    }

    /// True iff `token` is non-empty and `now - issued_at` is within the timeout
    pub fn is_session_valid(
        &self,
        token: &str,
        issued_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        !token.is_empty() && now - issued_at <= self.config.timeout
    }

    /// When a session issued at `issued_at` stops being valid
    pub fn session_expires_at(&self, issued_at: DateTime<Utc>) -> DateTime<Utc> {
        issued_at
            .checked_add_signed(self.config.timeout)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
