//! Repository trait for failed login attempt records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Error, storage::AttemptRecord};

/// Key-value store of [`AttemptRecord`]s keyed by normalized identifier.
///
/// Writes are always full-record replacements. An implementation must make a
/// single `put` or `delete` atomic per key; the lockout service serializes the
/// read-modify-write cycle around it.
///
/// Errors must be returned, never swallowed: the lockout service treats a store
/// failure as fatal rather than as "not locked".
#[async_trait]
pub trait AttemptRepository: Send + Sync + 'static {
    /// Fetch the record for `identifier`, if one exists.
    async fn get(&self, identifier: &str) -> Result<Option<AttemptRecord>, Error>;

    /// Insert or replace the record keyed by `record.identifier`.
    async fn put(&self, record: &AttemptRecord) -> Result<(), Error>;

    /// Remove the record for `identifier`. Removing a missing record is not an error.
    async fn delete(&self, identifier: &str) -> Result<(), Error>;

    /// Remove every record whose lock ran out at or before `now`.
    ///
    /// Returns the number of records removed.
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, Error>;
}
