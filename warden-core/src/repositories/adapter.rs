use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    repositories::{AttemptRepository, RepositoryProvider, ResetTokenRepository},
    storage::{AttemptRecord, ResetToken},
};

/// Adapter that exposes a provider's attempt repository as an [`AttemptRepository`]
pub struct AttemptRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AttemptRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> AttemptRepository for AttemptRepositoryAdapter<R> {
    async fn get(&self, identifier: &str) -> Result<Option<AttemptRecord>, Error> {
        self.provider.attempts().get(identifier).await
    }

    async fn put(&self, record: &AttemptRecord) -> Result<(), Error> {
        self.provider.attempts().put(record).await
    }

    async fn delete(&self, identifier: &str) -> Result<(), Error> {
        self.provider.attempts().delete(identifier).await
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.attempts().cleanup_expired(now).await
    }
}

/// Adapter that exposes a provider's reset token repository as a [`ResetTokenRepository`]
pub struct ResetTokenRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> ResetTokenRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> ResetTokenRepository for ResetTokenRepositoryAdapter<R> {
    async fn get(&self, identifier: &str) -> Result<Option<ResetToken>, Error> {
        self.provider.reset_tokens().get(identifier).await
    }

    async fn put(&self, token: &ResetToken) -> Result<(), Error> {
        self.provider.reset_tokens().put(token).await
    }

    async fn delete(&self, identifier: &str) -> Result<(), Error> {
        self.provider.reset_tokens().delete(identifier).await
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.reset_tokens().cleanup_expired(now).await
    }
}
