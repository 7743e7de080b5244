//! Credential hashing and clock helpers.
//!
//! The hash is a salted SHA-256 stand-in kept behind one function pair, so a
//! real password KDF can replace it without touching callers.

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use quiz_core::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash `password` with a fresh salt. Output format is `salt$hexdigest`.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest(&salt, password))
}

/// Check `password` against a value produced by [`hash_password`].
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Reject passwords too short to be set.
pub fn check_new_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::InvalidValue {
            field: "password",
            value: format!("must be at least {} characters", MIN_PASSWORD_LEN),
        });
    }
    Ok(())
}

/// Current wall clock as epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
