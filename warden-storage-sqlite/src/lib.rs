//! SQLite storage backend for warden
//!
//! Attempt records and reset tokens live in two tables, `attempt_records` and
//! `reset_tokens`, both keyed by the normalized identifier. Timestamps are stored
//! as unix milliseconds.
//!
//! ```rust,no_run
//! use warden_core::RepositoryProvider;
//! use warden_storage_sqlite::{SqliteRepositoryProvider, connect};
//!
//! # async fn run() -> Result<(), warden_core::Error> {
//! let pool = connect("sqlite://warden.db?mode=rwc").await?;
//! let provider = SqliteRepositoryProvider::new(pool);
//! provider.migrate().await?;
//! # Ok(())
//! # }
//! ```
pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqliteAttemptRepository, SqliteRepositoryProvider, SqliteResetTokenRepository,
};

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use warden_core::{Error, error::StorageError};

/// Open a connection pool for `url`.
///
/// An in-memory database exists per connection, so `:memory:` URLs get a pool of
/// exactly one connection that is never recycled.
pub async fn connect(url: &str) -> Result<SqlitePool, Error> {
    let mut options = SqlitePoolOptions::new();
    if url.contains(":memory:") {
        options = options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    options.connect(url).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to SQLite");
        Error::Storage(StorageError::Connection(e.to_string()))
    })
}
