//! Repository traits for data access layer
//!
//! Services never talk to a database directly; they are generic over the
//! repository traits defined here, so the same lockout and token logic runs
//! against the in-memory store in tests and against SQLite in production.
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for each table
//! - Individual `*RepositoryProvider` traits give access to each repository
//! - [`RepositoryProvider`] combines the providers with lifecycle methods
//!
//! Adapters in [`adapter`] turn an `Arc<impl RepositoryProvider>` back into the
//! individual repository traits the services expect.

pub mod adapter;
pub mod attempt;
pub mod memory;
pub mod reset_token;

pub use adapter::{AttemptRepositoryAdapter, ResetTokenRepositoryAdapter};
pub use attempt::AttemptRepository;
pub use memory::{
    InMemoryAttemptRepository, InMemoryRepositoryProvider, InMemoryResetTokenRepository,
};
pub use reset_token::ResetTokenRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for attempt record repository access.
pub trait AttemptRepositoryProvider: Send + Sync + 'static {
    /// The attempt repository implementation type
    type AttemptRepo: AttemptRepository;

    /// Get the attempt repository
    fn attempts(&self) -> &Self::AttemptRepo;
}

/// Provider trait for reset token repository access.
pub trait ResetTokenRepositoryProvider: Send + Sync + 'static {
    /// The reset token repository implementation type
    type ResetTokenRepo: ResetTokenRepository;

    /// Get the reset token repository
    fn reset_tokens(&self) -> &Self::ResetTokenRepo;
}

/// Provider trait that storage backends implement to supply every repository.
///
/// # Example
///
/// ```rust,ignore
/// use warden_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl AttemptRepositoryProvider for MyStorage {
///     type AttemptRepo = MyAttemptRepository;
///     fn attempts(&self) -> &Self::AttemptRepo { &self.attempts }
/// }
///
/// // ... ResetTokenRepositoryProvider ...
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: AttemptRepositoryProvider + ResetTokenRepositoryProvider {
    /// Create or upgrade the backing tables
    async fn migrate(&self) -> Result<(), Error>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> Result<(), Error>;
}
