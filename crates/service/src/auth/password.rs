//! Argon2 password hashing.
//!
//! Hashing is CPU bound, so both operations run on the blocking pool.

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;

use super::errors::AuthError;

pub const ALGORITHM: &str = "argon2";

/// Fixed hash verified when no account matches, so unknown emails cost a
/// full argon2 verification like wrong passwords do.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::encode_b64(b"no-such-account").ok()?;
    Argon2::default()
        .hash_password(b"no-such-account", &salt)
        .ok()
        .map(|h| h.to_string())
});

/// Hash with a fresh random salt; returns the PHC string.
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::HashError(e.to_string()))?
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|e| AuthError::HashError(e.to_string()))?
}

/// Verify `password` against the fixed dummy hash and discard the outcome.
pub async fn verify_dummy(password: String) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(parsed) = DUMMY_HASH.as_deref().and_then(|h| PasswordHash::new(h).ok()) {
            let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
        }
    })
    .await;
}
