use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Error, storage::ResetToken};

/// Repository for password reset tokens, at most one per identifier
#[async_trait]
pub trait ResetTokenRepository: Send + Sync + 'static {
    /// Fetch the active token for `identifier`
    async fn get(&self, identifier: &str) -> Result<Option<ResetToken>, Error>;

    /// Store `token`, replacing any previous token for the same identifier
    async fn put(&self, token: &ResetToken) -> Result<(), Error>;

    /// Remove the token for `identifier`; a missing token is not an error
    async fn delete(&self, identifier: &str) -> Result<(), Error>;

    /// Remove every token that expired before `now`, returning how many were removed
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error>;
}
