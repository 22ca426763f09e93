//! Password hashing using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, Result};

/// Hash a password, returning a PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored PHC hash
///
/// Malformed hashes verify as `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Basic shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::BadRequest("Email must contain @".to_string()));
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    Ok(())
}
