//! Token authority for session token issuance, validation and revocation
//!
//! Tokens are self-contained HS256 JWTs bound to a user id. A token is
//! accepted iff its signature verifies, it is unexpired, its issuer matches
//! and its exact string has not been revoked through logout.

use anyhow::Result;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::TokenError;
use crate::revocation::RevocationList;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Symmetric secret used to sign and verify tokens
    pub secret: String,
    /// Issuer claim written into and required from every token
    pub issuer: String,
    /// Token expiration time in seconds (default: 7 days)
    pub token_expiry: u64,
    /// Cron schedule of the revocation compaction job
    pub compaction_schedule: String,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Secret used to sign tokens (required)
    /// - `JWT_ISSUER`: Issuer claim (default: "income-api")
    /// - `JWT_TOKEN_EXPIRY`: Token expiry in seconds (default: 604800)
    /// - `JWT_COMPACTION_SCHEDULE`: Cron schedule for dropping expired revocations
    ///   (default: every 10 minutes)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let issuer = std::env::var("JWT_ISSUER").unwrap_or_else(|_| "income-api".to_string());

        let token_expiry = std::env::var("JWT_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .unwrap_or(604800);

        let compaction_schedule = std::env::var("JWT_COMPACTION_SCHEDULE")
            .unwrap_or_else(|_| "0 */10 * * * *".to_string());

        Ok(JwtConfig {
            secret,
            issuer,
            token_expiry,
            compaction_schedule,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub user_id: i64,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Issuer
    pub iss: String,
}

/// A freshly signed token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues, validates and revokes session tokens
///
/// Clones share the same revocation list, so one instance can be handed to
/// the router, the middleware and the compaction job.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
    revoked: RevocationList,
}

impl TokenAuthority {
    /// Initialize a new token authority with an empty revocation list
    pub fn new(config: JwtConfig) -> Result<Self> {
        if config.secret.is_empty() {
            anyhow::bail!("JWT secret must not be empty");
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Ok(TokenAuthority {
            encoding_key,
            decoding_key,
            validation,
            config,
            revoked: RevocationList::new(),
        })
    }

    /// Sign a token for a user, valid for the configured expiry
    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        let now = jsonwebtoken::get_current_timestamp();
        let exp = now
            .checked_add(self.config.token_expiry)
            .ok_or_else(|| TokenError::Signing("token expiry out of range".to_string()))?;

        let claims = Claims {
            user_id,
            iat: now,
            exp,
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;

        debug!("Issued token for user {}", user_id);
        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token and return its claims
    ///
    /// The revocation list is consulted first; the lock is released before
    /// the signature is verified.
    pub async fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        if self.revoked.contains(token).await {
            return Err(TokenError::Revoked);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Revoke a token so that it is rejected until it expires
    pub async fn revoke(&self, token: &str) -> Result<(), TokenError> {
        let expires_at = self.expiry_of(token);
        self.revoked.insert(token, expires_at).await?;
        info!("Token revoked");
        Ok(())
    }

    /// Validate a token and extract the user id it is bound to
    pub async fn user_id_of(&self, token: &str) -> Result<i64, TokenError> {
        let claims = self.validate(token).await?;
        Ok(claims.user_id)
    }

    /// Drop revocations whose tokens have expired
    pub async fn compact_revocations(&self) -> usize {
        self.revoked
            .compact(jsonwebtoken::get_current_timestamp())
            .await
    }

    /// Shared revocation list
    pub fn revocations(&self) -> &RevocationList {
        &self.revoked
    }

    /// Get the token expiry time in seconds
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }

    /// Get the configured compaction schedule
    pub fn compaction_schedule(&self) -> &str {
        &self.config.compaction_schedule
    }

    /// Expiry claim of a token with a valid signature, whether or not it has
    /// already expired. Unverifiable strings are kept for a full token lifetime.
    fn expiry_of(&self, token: &str) -> u64 {
        let mut lenient = self.validation.clone();
        lenient.validate_exp = false;

        match decode::<Claims>(token, &self.decoding_key, &lenient) {
            Ok(data) => data.claims.exp,
            Err(_) => {
                jsonwebtoken::get_current_timestamp().saturating_add(self.config.token_expiry)
            }
        }
    }
}
