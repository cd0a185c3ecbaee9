//! SQLite implementation of the attempt record repository.
//!
//! `locked_until` is stored as unix milliseconds. The lockout policy only
//! produces millisecond-aligned deadlines, so a record reads back unchanged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use warden_core::{
    Error, error::StorageError, repositories::AttemptRepository, storage::AttemptRecord,
};

/// SQLite repository for failed login attempt records.
pub struct SqliteAttemptRepository {
    pool: SqlitePool,
}

impl SqliteAttemptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Internal struct for query results
#[derive(Debug, sqlx::FromRow)]
struct SqliteAttemptRecord {
    identifier: String,
    attempt_count: i64,
    locked_until: Option<i64>,
}

impl TryFrom<SqliteAttemptRecord> for AttemptRecord {
    type Error = StorageError;

    fn try_from(row: SqliteAttemptRecord) -> Result<Self, Self::Error> {
        let attempt_count = u32::try_from(row.attempt_count).map_err(|_| {
            StorageError::Corrupt(format!("attempt_count out of range: {}", row.attempt_count))
        })?;
        let locked_until = row
            .locked_until
            .map(|ms| {
                DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                    StorageError::Corrupt(format!("locked_until out of range: {ms}"))
                })
            })
            .transpose()?;

        Ok(AttemptRecord {
            identifier: row.identifier,
            attempt_count,
            locked_until,
        })
    }
}

#[async_trait]
impl AttemptRepository for SqliteAttemptRepository {
    async fn get(&self, identifier: &str) -> Result<Option<AttemptRecord>, Error> {
        let row = sqlx::query_as::<_, SqliteAttemptRecord>(
            r#"
            SELECT identifier, attempt_count, locked_until
            FROM attempt_records
            WHERE identifier = ?
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to get attempt record");
            StorageError::Database("Failed to get attempt record".to_string())
        })?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    async fn put(&self, record: &AttemptRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO attempt_records (identifier, attempt_count, locked_until, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (identifier) DO UPDATE SET
                attempt_count = excluded.attempt_count,
                locked_until = excluded.locked_until,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.identifier)
        .bind(i64::from(record.attempt_count))
        .bind(record.locked_until.map(|dt| dt.timestamp_millis()))
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to store attempt record");
            StorageError::Database("Failed to store attempt record".to_string())
        })?;

        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM attempt_records WHERE identifier = ?")
            .bind(identifier)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to delete attempt record");
                StorageError::Database("Failed to delete attempt record".to_string())
            })?;

        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query(
            "DELETE FROM attempt_records WHERE locked_until IS NOT NULL AND locked_until <= ?",
        )
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to cleanup expired attempt records");
            StorageError::Database("Failed to cleanup expired attempt records".to_string())
        })?;

        Ok(result.rows_affected())
    }
}
