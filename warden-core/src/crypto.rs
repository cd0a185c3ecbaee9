//! Token generation and hashing
//!
//! Session and reset tokens are 256-bit values drawn from the operating system's
//! CSPRNG. Reset tokens are only ever persisted as a SHA-256 digest, and
//! verification compares digests in constant time via the `subtle` crate.
//!
//! SHA-256 is sufficient here because the tokens carry 256 bits of entropy;
//! a slow password hash buys nothing against an unguessable input.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// Number of random bytes in every generated token.
pub const TOKEN_BYTES: usize = 32;

/// Generate a cryptographically secure random token.
///
/// Returns 32 random bytes encoded as URL-safe base64 without padding (43 characters).
pub fn generate_secure_token() -> Result<String, CryptoError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a token for storage. Returns the hex-encoded SHA-256 digest.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a plaintext token against a stored digest in constant time.
pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);
    constant_time_compare(computed_hash.as_bytes(), stored_hash.as_bytes())
}

/// Constant-time equality of two byte slices. Slices of different length are never equal.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
