//! Service layer for business logic
//!
//! Services combine the pure policy code with repository access. They take the
//! current time as an argument so behavior is fully determined by their inputs.

pub mod lockout;
pub mod reset_token;
pub mod session;

pub use lockout::LockoutService;
pub use reset_token::ResetTokenService;
pub use session::SessionTokenService;
