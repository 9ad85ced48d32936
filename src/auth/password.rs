use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, error, instrument};

use crate::errors::ServiceError;

/// Hashes a plain-text password using Argon2 with a random salt.
#[instrument(skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    if password.is_empty() {
        return Err(ServiceError::ValidationError(
            "password must not be empty".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Argon2 password hashing failed");
            ServiceError::HashError(e.to_string())
        })
}

/// Verifies a plain-text password against a stored Argon2 hash.
pub fn verify_password(hash: &str, provided: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "Failed to parse stored password hash");
        ServiceError::HashError(e.to_string())
    })?;

    match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => {
            debug!("Password verification failed: passwords do not match");
            Ok(false)
        }
        Err(e) => Err(ServiceError::HashError(e.to_string())),
    }
}
