//! Authentication gate for protected routes
//!
//! Requests must carry `Authorization: Bearer <token>`. Missing headers,
//! other schemes and tokens the authority rejects all end in 401 before the
//! handler runs. Accepted requests carry an [`AuthSession`] in their
//! extensions.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{error::AuthError, jwt::TokenAuthority};

/// Authenticated caller attached to the request by [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: i64,
    /// Raw bearer token, needed to revoke it on logout
    pub token: String,
}

/// Extract and validate the bearer token from the Authorization header
pub async fn auth_middleware(
    State(authority): State<TokenAuthority>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidToken)?;

    let claims = authority.validate(token).await.map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        AuthError::InvalidToken
    })?;

    let session = AuthSession {
        user_id: claims.user_id,
        token: token.to_string(),
    };
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{Claims, JwtConfig};
    use axum::{
        Router,
        http::StatusCode,
        middleware,
        routing::get,
    };
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::Value;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tower::ServiceExt;

    fn authority() -> TokenAuthority {
        TokenAuthority::new(JwtConfig {
            secret: "gate-secret".to_string(),
            issuer: "income-api".to_string(),
            token_expiry: 3600,
            compaction_schedule: "0 */10 * * * *".to_string(),
        })
        .unwrap()
    }

    fn app(authority: TokenAuthority, hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(move |session: AuthSession| {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        format!("{}:{}", session.user_id, session.token)
                    }
                }),
            )
            .route_layer(middleware::from_fn_with_state(authority, auth_middleware))
    }

    async fn send(app: Router, authorization: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn error_of(body: &[u8]) -> Value {
        let value: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(value["status"], Value::Bool(false));
        value["error"].clone()
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (status, body) = send(app(authority(), hits.clone()), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(&body), "Token Not Found");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_rejected() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (status, body) = send(app(authority(), hits.clone()), Some("Basic YWRtaW4=")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(&body), "Invalid token");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_token_never_reaches_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let now = jsonwebtoken::get_current_timestamp();
        let expired = encode(
            &Header::default(),
            &Claims {
                user_id: 1,
                iat: now - 600,
                exp: now - 300,
                iss: "income-api".to_string(),
            },
            &EncodingKey::from_secret(b"gate-secret"),
        )
        .unwrap();

        let (status, body) = send(
            app(authority(), hits.clone()),
            Some(&format!("Bearer {}", expired)),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(&body), "Invalid token");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let hits = Arc::new(AtomicUsize::new(0));
        let authority = authority();
        let issued = authority.issue(5).unwrap();
        authority.revoke(&issued.token).await.unwrap();

        let (status, _) = send(
            app(authority, hits.clone()),
            Some(&format!("Bearer {}", issued.token)),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_attaches_session() {
        let hits = Arc::new(AtomicUsize::new(0));
        let authority = authority();
        let issued = authority.issue(5).unwrap();

        let (status, body) = send(
            app(authority, hits.clone()),
            Some(&format!("Bearer {}", issued.token)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), format!("5:{}", issued.token));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
