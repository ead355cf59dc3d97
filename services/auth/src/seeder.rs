//! Initial user seeding from a bundled JSON file
//!
//! The file holds `[{"username": "...", "password": "..."}]` with plaintext
//! passwords; each one is hashed before insert. Existing usernames are left
//! untouched so the seeder can run on every start.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::credentials::hash_password;
use crate::models::{LoginRequest, NewUser};
use crate::repositories::UserRepository;
use crate::validation::validate_login;

#[derive(Debug, Deserialize)]
struct SeedUser {
    username: String,
    password: String,
}

/// Insert every user of the seed file that does not exist yet
///
/// Returns the number of users created.
pub async fn seed_users(users: &dyn UserRepository, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;

    let seeds: Vec<SeedUser> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

    let mut created = 0;
    for seed in seeds {
        let credentials = LoginRequest {
            username: seed.username,
            password: seed.password,
        };
        if let Err(e) = validate_login(&credentials) {
            warn!("Skipping seed user: {}", e);
            continue;
        }

        let password = credentials.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let inserted = users
            .create_if_absent(&NewUser {
                username: credentials.username.clone(),
                password_hash,
            })
            .await
            .with_context(|| format!("Failed to seed user {}", credentials.username))?;

        if inserted {
            created += 1;
        }
    }

    info!("Seeded {} users from {}", created, path.display());
    Ok(created)
}
