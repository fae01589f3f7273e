//! Password hashing.
//!
//! Credentials are stored as Argon2id PHC strings with a random salt. The
//! plaintext never leaves this module.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors from hashing or verifying a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("password hashing error: {0}")]
    Hash(String),

    /// The stored hash is not a valid PHC string.
    #[error("malformed password hash")]
    MalformedHash,

    /// The password does not match.
    #[error("invalid credentials")]
    Mismatch,
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `PasswordError::MalformedHash` if `hash` cannot be parsed and
/// `PasswordError::Mismatch` if the password is wrong.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::MalformedHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::Mismatch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_and_verifies() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("password123"));

        assert!(verify_password("password123", &hash).is_ok());
        assert!(matches!(
            verify_password("password124", &hash),
            Err(PasswordError::Mismatch)
        ));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(
            hash_password("password123").unwrap(),
            hash_password("password123").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("password123", "plaintext"),
            Err(PasswordError::MalformedHash)
        ));
    }
}
