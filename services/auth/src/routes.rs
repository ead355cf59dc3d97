//! Login and logout routes, mounted under `/api/user`

use axum::{
    Json, Router,
    extract::State,
    http::header::{EXPIRES, SET_COOKIE},
    middleware,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::WithRejection;
use common::response::{EmptyObject, Envelope};
use tracing::{error, info, warn};

use crate::{
    credentials::CredentialVerifier,
    error::AuthError,
    jwt::TokenAuthority,
    middleware::{AuthSession, auth_middleware},
    models::{LoginRequest, LoginResponse},
    validation::validate_login,
};

/// Shared state of the authentication routes
#[derive(Clone)]
pub struct AuthState {
    pub token_authority: TokenAuthority,
    pub verifier: CredentialVerifier,
}

/// Create the router for the authentication endpoints
///
/// `/logout` sits behind the authentication gate, `/login` does not.
pub fn create_router(state: AuthState) -> Router {
    Router::new()
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(
            state.token_authority.clone(),
            auth_middleware,
        ))
        .route("/login", post(login))
        .with_state(state)
}

/// User login endpoint
pub async fn login(
    State(state): State<AuthState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AuthError>,
) -> Result<Envelope<LoginResponse>, AuthError> {
    info!("Login attempt for user: {}", payload.username);

    validate_login(&payload).map_err(AuthError::Validation)?;

    let user_id = state
        .verifier
        .verify(&payload.username, &payload.password)
        .await?;

    let issued = state.token_authority.issue(user_id).map_err(|e| {
        error!("Failed to issue token for user {}: {}", user_id, e);
        AuthError::Internal
    })?;

    info!("User {} logged in", user_id);
    Ok(Envelope::success(
        "Login OK",
        LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
        },
    ))
}

/// Logout endpoint, revokes the bearer token of the session
pub async fn logout(
    State(state): State<AuthState>,
    session: AuthSession,
) -> Result<impl IntoResponse, AuthError> {
    state
        .token_authority
        .revoke(&session.token)
        .await
        .map_err(|e| {
            warn!("Logout failed for user {}: {}", session.user_id, e);
            AuthError::LogoutFailed(e)
        })?;

    info!("User {} logged out", session.user_id);
    Ok((
        [
            (SET_COOKIE, "token=; Path=/; Max-Age=-1"),
            (EXPIRES, "Thu, 01 Jan 1970 00:00:00 GMT"),
        ],
        Envelope::success("Logout OK", EmptyObject {}),
    ))
}
