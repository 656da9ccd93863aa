/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use once_cell::sync::Lazy;

use crate::error::{AuthError, Result};

/// Digest checked when the claimed account does not exist, so the unknown-user
/// path costs one Argon2 verification like the wrong-password path.
static DECOY_DIGEST: Lazy<String> =
    Lazy::new(|| hash_password("imageshare-decoy-password").unwrap_or_default());

/// Hash a password using Argon2id with a fresh random salt.
/// Returns the PHC string suitable for storage in the database.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored digest.
///
/// Never fails: a mismatch or an unparsable digest both yield `false`.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let parsed_hash = match PasswordHash::new(digest) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!("Stored password digest is not a valid PHC string: {}", e);
            return false;
        }
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(e) => {
            tracing::warn!("Password verification failed: {}", e);
            false
        }
    }
}

/// Run a full verification against [`DECOY_DIGEST`]. Always `false`.
pub fn verify_against_decoy(password: &str) -> bool {
    verify_password(password, &DECOY_DIGEST);
    false
}
