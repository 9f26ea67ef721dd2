//! Argon2id password checks and the minimum length rule.
//!
//! Hashes are produced by the storage layer; this module only reads
//! them back. Both sides put the pepper in front of the password.

use std::borrow::Cow;

use argon2::password_hash::Error as HashError;
use argon2::{Argon2, PasswordHash, PasswordVerifier};

use crate::error::AuthError;

fn peppered<'a>(password: &'a str, pepper: Option<&str>) -> Cow<'a, str> {
    match pepper {
        Some(pepper) => Cow::Owned([pepper, password].concat()),
        None => Cow::Borrowed(password),
    }
}

/// Check `password` against a PHC string.
///
/// A mismatch is `Ok(false)`; only an unreadable hash is an error.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let stored = PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("stored hash is not PHC: {e}")))?;
    let candidate = peppered(password, pepper);

    match Argon2::default().verify_password(candidate.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("argon2: {e}"))),
    }
}

/// Length is counted in characters, not bytes.
pub fn check_password_policy(password: &str, min_length: usize) -> Result<(), AuthError> {
    match password.chars().count() {
        n if n >= min_length => Ok(()),
        _ => Err(AuthError::WeakPassword { min_length }),
    }
}
