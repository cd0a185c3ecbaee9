//! In-process repositories backed by [`DashMap`].
//!
//! Useful for tests and for single-process deployments that can afford to lose
//! lockout state on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::{
    Error,
    repositories::{
        AttemptRepository, AttemptRepositoryProvider, RepositoryProvider, ResetTokenRepository,
        ResetTokenRepositoryProvider,
    },
    storage::{AttemptRecord, ResetToken},
};

#[derive(Debug, Default)]
pub struct InMemoryAttemptRepository {
    records: DashMap<String, AttemptRecord>,
}

impl InMemoryAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AttemptRepository for InMemoryAttemptRepository {
    async fn get(&self, identifier: &str) -> Result<Option<AttemptRecord>, Error> {
        Ok(self.records.get(identifier).map(|r| r.value().clone()))
    }

    async fn put(&self, record: &AttemptRecord) -> Result<(), Error> {
        self.records
            .insert(record.identifier.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), Error> {
        self.records.remove(identifier);
        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let mut removed = 0u64;
        self.records.retain(|_, record| {
            let keep = !record.lock_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryResetTokenRepository {
    tokens: DashMap<String, ResetToken>,
}

impl InMemoryResetTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl ResetTokenRepository for InMemoryResetTokenRepository {
    async fn get(&self, identifier: &str) -> Result<Option<ResetToken>, Error> {
        Ok(self.tokens.get(identifier).map(|t| t.value().clone()))
    }

    async fn put(&self, token: &ResetToken) -> Result<(), Error> {
        self.tokens.insert(token.identifier.clone(), token.clone());
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), Error> {
        self.tokens.remove(identifier);
        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let mut removed = 0u64;
        self.tokens.retain(|_, token| {
            let keep = !token.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

/// Repository provider holding both in-memory repositories.
#[derive(Debug, Default)]
pub struct InMemoryRepositoryProvider {
    attempts: InMemoryAttemptRepository,
    reset_tokens: InMemoryResetTokenRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptRepositoryProvider for InMemoryRepositoryProvider {
    type AttemptRepo = InMemoryAttemptRepository;

    fn attempts(&self) -> &Self::AttemptRepo {
        &self.attempts
    }
}

impl ResetTokenRepositoryProvider for InMemoryRepositoryProvider {
    type ResetTokenRepo = InMemoryResetTokenRepository;

    fn reset_tokens(&self) -> &Self::ResetTokenRepo {
        &self.reset_tokens
    }
}

#[async_trait]
impl RepositoryProvider for InMemoryRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}
