//! SQLite implementation of the reset token repository.
//!
//! Timestamps are unix milliseconds. The reset token service truncates both
//! timestamps to whole milliseconds before storing them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use warden_core::{
    Error, error::StorageError, repositories::ResetTokenRepository, storage::ResetToken,
};

pub struct SqliteResetTokenRepository {
    pool: SqlitePool,
}

impl SqliteResetTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteResetToken {
    identifier: String,
    token_hash: String,
    expires_at: i64,
    created_at: i64,
}

fn from_millis(column: &str, ms: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::Corrupt(format!("{column} out of range: {ms}")))
}

impl TryFrom<SqliteResetToken> for ResetToken {
    type Error = StorageError;

    fn try_from(row: SqliteResetToken) -> Result<Self, Self::Error> {
        Ok(ResetToken {
            identifier: row.identifier,
            token_hash: row.token_hash,
            expires_at: from_millis("expires_at", row.expires_at)?,
            created_at: from_millis("created_at", row.created_at)?,
        })
    }
}

#[async_trait]
impl ResetTokenRepository for SqliteResetTokenRepository {
    async fn get(&self, identifier: &str) -> Result<Option<ResetToken>, Error> {
        let row = sqlx::query_as::<_, SqliteResetToken>(
            r#"
            SELECT identifier, token_hash, expires_at, created_at
            FROM reset_tokens
            WHERE identifier = ?
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to get reset token");
            StorageError::Database("Failed to get reset token".to_string())
        })?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    async fn put(&self, token: &ResetToken) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO reset_tokens (identifier, token_hash, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (identifier) DO UPDATE SET
                token_hash = excluded.token_hash,
                expires_at = excluded.expires_at,
                created_at = excluded.created_at
            "#,
        )
        .bind(&token.identifier)
        .bind(&token.token_hash)
        .bind(token.expires_at.timestamp_millis())
        .bind(token.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to store reset token");
            StorageError::Database("Failed to store reset token".to_string())
        })?;

        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM reset_tokens WHERE identifier = ?")
            .bind(identifier)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to delete reset token");
                StorageError::Database("Failed to delete reset token".to_string())
            })?;

        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM reset_tokens WHERE expires_at < ?")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to cleanup expired reset tokens");
                StorageError::Database("Failed to cleanup expired reset tokens".to_string())
            })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::{SqliteMigrationManager, all};
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;
    use warden_migration::MigrationManager;

    async fn setup_test_db() -> SqlitePool {
        let _ = tracing_subscriber::fmt().try_init();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create pool");

        let manager = SqliteMigrationManager::new(pool.clone());
        manager.initialize().await.expect("Failed to initialize");
        manager.up(&all()).await.expect("Failed to run migrations");

        pool
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_456).unwrap()
    }

    fn token(identifier: &str, hash: &str, expires_at: DateTime<Utc>) -> ResetToken {
        ResetToken {
            identifier: identifier.to_string(),
            token_hash: hash.to_string(),
            expires_at,
            created_at: t0(),
        }
    }

    #[tokio::test]
    async fn test_put_get_and_replace() {
        let repo = SqliteResetTokenRepository::new(setup_test_db().await);

        let first = token("a@b.com", "first", t0() + Duration::hours(1));
        repo.put(&first).await.unwrap();
        assert_eq!(repo.get("a@b.com").await.unwrap(), Some(first));

        let second = token("a@b.com", "second", t0() + Duration::hours(2));
        repo.put(&second).await.unwrap();
        assert_eq!(repo.get("a@b.com").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = SqliteResetTokenRepository::new(setup_test_db().await);

        repo.put(&token("a@b.com", "hash", t0())).await.unwrap();
        repo.delete("a@b.com").await.unwrap();
        repo.delete("a@b.com").await.unwrap();
        assert!(repo.get("a@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let repo = SqliteResetTokenRepository::new(setup_test_db().await);

        repo.put(&token("old@b.com", "a", t0() - Duration::milliseconds(1)))
            .await
            .unwrap();
        repo.put(&token("edge@b.com", "b", t0())).await.unwrap();
        repo.put(&token("new@b.com", "c", t0() + Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(repo.cleanup_expired(t0()).await.unwrap(), 1);
        assert!(repo.get("old@b.com").await.unwrap().is_none());
        assert!(repo.get("edge@b.com").await.unwrap().is_some());
        assert!(repo.get("new@b.com").await.unwrap().is_some());
    }
}
