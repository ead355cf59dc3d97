//! Authentication for the income API
//!
//! Credential verification, session token issuance and revocation, the
//! bearer-token gate and the `/api/user` login/logout routes.

pub mod credentials;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod revocation;
pub mod routes;
pub mod seeder;
pub mod validation;

pub use credentials::CredentialVerifier;
pub use error::{AuthError, TokenError};
pub use jwt::{JwtConfig, TokenAuthority};
pub use middleware::{AuthSession, auth_middleware};
pub use routes::{AuthState, create_router};
