//! Credential verification against stored Argon2 password hashes

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::AuthError;
use crate::repositories::UserRepository;

/// Hash a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored PHC hash string
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Checks username/password pairs against stored users
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserRepository>,
}

impl CredentialVerifier {
    /// Create a new credential verifier
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Resolve the user id for a valid username/password pair
    pub async fn verify(&self, username: &str, password: &str) -> Result<i64, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(|e| {
                error!("Failed to look up user: {}", e);
                AuthError::Internal
            })?
            .ok_or(AuthError::UsernameNotRegistered)?;

        // Argon2 is deliberately slow; keep it off the async workers
        let password_hash = user.password_hash.clone();
        let password = password.to_string();
        let verify = move || verify_password(&password_hash, &password);
        let matches = tokio::task::spawn_blocking(verify)
            .await
            .map_err(|e| {
                error!("Password verification task failed: {}", e);
                AuthError::Internal
            })?
            .map_err(|e| {
                error!("Stored password hash for user {} is unusable: {}", user.id, e);
                AuthError::Internal
            })?;

        if !matches {
            warn!("Wrong password for user: {}", username);
            return Err(AuthError::WrongPassword);
        }

        info!("Credentials verified for user {}", user.id);
        Ok(user.id)
    }
}
