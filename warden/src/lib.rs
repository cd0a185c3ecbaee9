//! # Warden
//!
//! Warden protects password logins. It counts consecutive failed logins per
//! account and locks the account for a while once a limit is reached, issues
//! random session bearer tokens with a fixed lifetime, and issues single-use
//! password reset tokens that expire.
//!
//! The defaults are five failures, a fifteen minute lock, 24 hour sessions and
//! one hour reset tokens. All of them are configurable through [`WardenConfig`].
//!
//! ## Storage Support
//!
//! Warden stores attempt records and reset tokens through a
//! [`RepositoryProvider`]. Two are included:
//! - [`InMemoryRepositoryProvider`], for tests and single-process deployments
//! - SQLite (`sqlite` feature, on by default)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use warden::{Warden, SqliteRepositoryProvider, connect};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), warden::WardenError> {
//!     let pool = connect("sqlite://warden.db?mode=rwc").await?;
//!     let warden = Warden::new(Arc::new(SqliteRepositoryProvider::new(pool)));
//!     warden.migrate().await?;
//!
//!     let status = warden.check_status("user@example.com").await?;
//!     if status.is_locked {
//!         println!("try again in {} minutes", status.remaining_minutes);
//!         return Ok(());
//!     }
//!
//!     // ... verify the password ...
//!     let password_ok = false;
//!     if password_ok {
//!         warden.clear_on_success("user@example.com").await?;
//!         let session = warden.issue_session_token()?;
//!         println!("session expires at {}", session.expires_at);
//!     } else {
//!         let outcome = warden.record_failure("user@example.com").await?;
//!         println!("{} attempts left", outcome.remaining_attempts);
//!     }
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::{sync::watch, task::JoinHandle};
use warden_core::{
    repositories::{AttemptRepositoryAdapter, ResetTokenRepositoryAdapter},
    services::{LockoutService, ResetTokenService, SessionTokenService},
    validation,
};

/// Re-export core types from warden_core
pub use warden_core::{
    AttemptRecord, Clock, FailureOutcome, LockoutConfig, LockoutStatus, ManualClock,
    PasswordStrength, RepositoryProvider, ResetTokenConfig, SessionConfig, SessionToken,
    SystemClock, WardenConfig,
    error::ValidationError,
    repositories::InMemoryRepositoryProvider,
};

/// Re-export storage backends
#[cfg(feature = "sqlite")]
pub use warden_storage_sqlite::{SqliteRepositoryProvider, connect};

/// Errors returned by [`Warden`].
///
/// A locked account or an expired token is not an error; those are reported in
/// the returned values.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    /// The backing store failed. Lockout state is unknown, so callers must not
    /// let the login proceed.
    #[error("Storage error: {0}")]
    Storage(String),
    /// Input was rejected by a validator
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Secure random bytes were unavailable
    #[error("Token error: {0}")]
    Token(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<warden_core::Error> for WardenError {
    fn from(error: warden_core::Error) -> Self {
        match error {
            warden_core::Error::Storage(e) => WardenError::Storage(e.to_string()),
            warden_core::Error::Validation(e) => WardenError::Validation(e),
            warden_core::Error::Crypto(e) => WardenError::Token(e.to_string()),
            warden_core::Error::Config(e) => WardenError::Config(e.to_string()),
        }
    }
}

/// Records removed by one [`Warden::cleanup_expired`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub attempt_records: u64,
    pub reset_tokens: u64,
}

impl CleanupReport {
    pub fn total(&self) -> u64 {
        self.attempt_records + self.reset_tokens
    }
}

/// Coordinates the lockout, session and reset token services over one storage
/// backend and one clock.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use warden::{InMemoryRepositoryProvider, Warden};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), warden::WardenError> {
/// let warden = Warden::new(Arc::new(InMemoryRepositoryProvider::new()));
///
/// let token = warden.issue_reset_token("user@example.com").await?;
/// assert!(warden.validate_reset_token("user@example.com", &token).await?);
/// # Ok(())
/// # }
/// ```
pub struct Warden<R: RepositoryProvider> {
    repositories: Arc<R>,
    config: WardenConfig,
    clock: Arc<dyn Clock>,
    lockout_service: Arc<LockoutService<AttemptRepositoryAdapter<R>>>,
    reset_token_service: Arc<ResetTokenService<ResetTokenRepositoryAdapter<R>>>,
    session_service: SessionTokenService,
}

impl<R: RepositoryProvider> Warden<R> {
    /// Create a Warden with the default configuration and the system clock.
    pub fn new(repositories: Arc<R>) -> Self {
        Self::build(repositories, WardenConfig::default(), Arc::new(SystemClock))
    }

    fn build(repositories: Arc<R>, config: WardenConfig, clock: Arc<dyn Clock>) -> Self {
        let attempts = Arc::new(AttemptRepositoryAdapter::new(repositories.clone()));
        let reset_tokens = Arc::new(ResetTokenRepositoryAdapter::new(repositories.clone()));

        Self {
            lockout_service: Arc::new(LockoutService::new(attempts, config.lockout.clone())),
            reset_token_service: Arc::new(ResetTokenService::new(
                reset_tokens,
                config.reset_token.clone(),
            )),
            session_service: SessionTokenService::new(config.session.clone()),
            repositories,
            config,
            clock,
        }
    }

    /// Replace the configuration.
    ///
    /// The configuration is validated first. Services are rebuilt, so call this
    /// before sharing the instance.
    pub fn with_config(self, config: WardenConfig) -> Result<Self, WardenError> {
        config
            .validate()
            .map_err(|e| WardenError::Config(e.to_string()))?;
        Ok(Self::build(self.repositories, config, self.clock))
    }

    /// Use `clock` instead of the system clock for every time-dependent decision.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), WardenError> {
        Ok(self.repositories.migrate().await?)
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), WardenError> {
        Ok(self.repositories.health_check().await?)
    }

    /// Lockout status for `identifier`. Call before checking credentials.
    ///
    /// An expired lock is cleared as a side effect.
    pub async fn check_status(&self, identifier: &str) -> Result<LockoutStatus, WardenError> {
        Ok(self
            .lockout_service
            .check_status(identifier, self.now())
            .await?)
    }

    pub async fn is_locked(&self, identifier: &str) -> Result<bool, WardenError> {
        Ok(self.lockout_service.is_locked(identifier, self.now()).await?)
    }

    /// Record a failed login for `identifier`
    pub async fn record_failure(&self, identifier: &str) -> Result<FailureOutcome, WardenError> {
        Ok(self
            .lockout_service
            .record_failure(identifier, self.now())
            .await?)
    }

    /// Forget failed logins for `identifier` after a successful one
    pub async fn clear_on_success(&self, identifier: &str) -> Result<(), WardenError> {
        Ok(self.lockout_service.clear_on_success(identifier).await?)
    }

    /// Lift a lock early. Returns `true` if the account was locked.
    pub async fn unlock(&self, identifier: &str) -> Result<bool, WardenError> {
        Ok(self.lockout_service.unlock(identifier, self.now()).await?)
    }

    pub fn issue_session_token(&self) -> Result<SessionToken, WardenError> {
        Ok(self.session_service.issue_session_token(self.now())?)
    }

    /// True iff `token` is non-empty and was issued no more than the session
    /// timeout ago.
    pub fn is_session_valid(&self, token: &str, issued_at: DateTime<Utc>) -> bool {
        self.session_service
            .is_session_valid(token, issued_at, self.now())
    }

    /// Issue a password reset token for `identifier`, invalidating any earlier one.
    pub async fn issue_reset_token(&self, identifier: &str) -> Result<String, WardenError> {
        Ok(self
            .reset_token_service
            .issue_reset_token(identifier, self.now())
            .await?)
    }

    pub async fn validate_reset_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<bool, WardenError> {
        Ok(self
            .reset_token_service
            .validate_reset_token(identifier, token, self.now())
            .await?)
    }

    /// Drop the reset token for `identifier` once the reset is done
    pub async fn clear_reset_token(&self, identifier: &str) -> Result<(), WardenError> {
        Ok(self
            .reset_token_service
            .clear_reset_token(identifier)
            .await?)
    }

    /// Check an email address. Returns the normalized form.
    pub fn validate_email(&self, email: &str) -> Result<String, WardenError> {
        Ok(validation::validate_email(email)?)
    }

    /// Check a password and rate its strength
    pub fn validate_password(&self, password: &str) -> Result<PasswordStrength, WardenError> {
        Ok(validation::validate_password(password)?)
    }

    /// Delete expired locks and expired reset tokens.
    pub async fn cleanup_expired(&self) -> Result<CleanupReport, WardenError> {
        let now = self.now();
        Ok(CleanupReport {
            attempt_records: self.lockout_service.cleanup_expired(now).await?,
            reset_tokens: self.reset_token_service.cleanup_expired(now).await?,
        })
    }

    /// Start the background cleanup task.
    ///
    /// Every `cleanup_interval` the task removes expired locks and reset tokens.
    /// It stops when `shutdown` changes or its sender is dropped.
    pub fn start_cleanup_task(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let lockout = Arc::clone(&self.lockout_service);
        let reset_tokens = Arc::clone(&self.reset_token_service);
        let clock = Arc::clone(&self.clock);
        let period = self
            .config
            .cleanup_interval
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(3600));

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(period);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let now = clock.now();
                        match lockout.cleanup_expired(now).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count = count, "Cleaned up expired account locks");
                            }
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    "Failed to cleanup expired account locks"
                                );
                            }
                            _ => {}
                        }
                        match reset_tokens.cleanup_expired(now).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count = count, "Cleaned up expired reset tokens");
                            }
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    "Failed to cleanup expired reset tokens"
                                );
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down warden cleanup task");
                        break;
                    }
                }
            }
        })
    }
}
