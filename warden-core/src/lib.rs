//! Core functionality for the warden project
//!
//! This crate holds everything the account protection flow needs that is not tied
//! to a particular database:
//!
//! - [`policy::LockoutPolicy`], the pure lock/unlock decision over an
//!   [`AttemptRecord`] and a timestamp
//! - [`services`], which apply those decisions to a repository, and issue and
//!   validate session and password reset tokens
//! - [`repositories`], the storage traits plus an in-memory implementation
//! - [`validation`], email and password checks used before any of the above
//!
//! Storage backends depend on this crate and implement
//! [`repositories::RepositoryProvider`]. Application code normally uses the
//! `warden` crate, which wires the services together.
pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod policy;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod sync;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LockoutConfig, ResetTokenConfig, SessionConfig, WardenConfig};
pub use error::Error;
pub use repositories::RepositoryProvider;
pub use storage::{AttemptRecord, FailureOutcome, LockoutStatus, ResetToken, SessionToken};
pub use validation::PasswordStrength;
