//! Authentication Middleware
//! Mission: Protect API endpoints with session token validation and a role gate

use crate::auth::{models::Claims, models::Role, token::SessionTokenCodec};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Middleware that validates the bearer session token.
///
/// On success the decoded claims are inserted into request extensions for
/// downstream handlers and the role gate.
pub async fn auth_middleware(
    State(codec): State<Arc<dyn SessionTokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or(AuthError::MissingToken)?;

    let claims = codec
        .verify(&token)
        .map_err(|_| AuthError::InvalidToken)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Role gate for admin-only routes (use after `auth_middleware`).
///
/// A pure function of the verified claims: admins pass, every other role
/// is denied. Denial is distinct from an authentication failure - the
/// caller is known, just not permitted.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    let role = req
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.role)
        .ok_or(AuthError::MissingToken)?;

    match role {
        Role::Admin => Ok(next.run(req).await),
        Role::User => Err(AuthError::Forbidden),
    }
}

/// Extract claims from request (use after auth middleware)
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

/// Auth error types
///
/// MissingToken and InvalidToken are distinct variants for logging, but
/// share one response body so clients learn nothing about why a token
/// was rejected.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken | AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Authentication required")
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Admin access required"),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest};
    use uuid::Uuid;

    #[test]
    fn test_auth_error_responses() {
        let missing = AuthError::MissingToken.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let invalid = AuthError::InvalidToken.into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        let forbidden = AuthError::Forbidden.into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_extract_claims_from_request() {
        let mut req = HttpRequest::new(Body::empty());

        // No claims initially
        assert!(extract_claims(&req).is_none());

        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "test".to_string(),
            role: Role::Admin,
            iat: 1234560000,
            exp: 1234567890,
        };
        req.extensions_mut().insert(claims.clone());

        let extracted = extract_claims(&req);
        assert!(extracted.is_some());
        assert_eq!(extracted.unwrap().username, "test");
    }
}
