//! CSRF Middleware
//! Mission: Gate state-mutating requests behind a valid one-time token pair

use crate::csrf::store::CsrfTokenStore;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

pub const CSRF_TOKEN_HEADER: &str = "x-csrf-token";
pub const CSRF_SESSION_HEADER: &str = "x-csrf-session-token";

/// Public endpoints exempt from CSRF checks even for mutating methods.
/// Login is exempt: it precedes any session, and a failed login must come
/// back as a generic 401, never a CSRF 403.
const EXEMPT_PATHS: &[&str] = &[
    "/api/health",
    "/api/analytics/visit",
    "/api/csrf-token",
    "/api/auth/login",
];

/// Middleware enforcing the CSRF challenge on mutating API requests.
///
/// Safe methods pass through, OPTIONS always passes (CORS preflight), and
/// exempted public endpoints pass. POST/PUT/DELETE on `/api/` paths must
/// carry both token headers, well-formed, and the pair must validate
/// against the store; otherwise the downstream handler is never invoked.
pub async fn csrf_protection(
    State(store): State<Arc<CsrfTokenStore>>,
    req: Request,
    next: Next,
) -> Result<Response, CsrfError> {
    let method = req.method();
    let path = req.uri().path();

    if method == Method::OPTIONS || !is_mutating(method) {
        return Ok(next.run(req).await);
    }

    if EXEMPT_PATHS.iter().any(|p| path.starts_with(p)) {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let challenge = header_token(req.headers(), CSRF_TOKEN_HEADER)?;
    let session = header_token(req.headers(), CSRF_SESSION_HEADER)?;

    let client_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !store.validate(&session, &challenge, &client_addr) {
        return Err(CsrfError::TokenInvalidOrExpired);
    }

    Ok(next.run(req).await)
}

fn is_mutating(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::DELETE)
}

/// Pull a token header, distinguishing absent from malformed.
fn header_token(headers: &HeaderMap, name: &str) -> Result<String, CsrfError> {
    let value = headers.get(name).ok_or(CsrfError::TokenMissing)?;
    let value = value.to_str().map_err(|_| CsrfError::TokenMalformed)?;

    if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CsrfError::TokenMalformed);
    }

    Ok(value.to_string())
}

/// CSRF rejection taxonomy
#[derive(Debug, PartialEq, Eq)]
pub enum CsrfError {
    TokenMissing,
    TokenMalformed,
    TokenInvalidOrExpired,
}

impl IntoResponse for CsrfError {
    fn into_response(self) -> Response {
        let message = match self {
            CsrfError::TokenMissing => "CSRF token required",
            CsrfError::TokenMalformed => "Invalid CSRF token",
            CsrfError::TokenInvalidOrExpired => "Invalid or expired CSRF token",
        };

        (StatusCode::FORBIDDEN, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header_is_distinct_from_malformed() {
        let headers = HeaderMap::new();
        assert_eq!(
            header_token(&headers, CSRF_TOKEN_HEADER).unwrap_err(),
            CsrfError::TokenMissing
        );

        let headers = headers_with(CSRF_TOKEN_HEADER, "too-short");
        assert_eq!(
            header_token(&headers, CSRF_TOKEN_HEADER).unwrap_err(),
            CsrfError::TokenMalformed
        );
    }

    #[test]
    fn test_non_hex_token_is_malformed() {
        let value = "z".repeat(64);
        let headers = headers_with(CSRF_TOKEN_HEADER, &value);
        assert_eq!(
            header_token(&headers, CSRF_TOKEN_HEADER).unwrap_err(),
            CsrfError::TokenMalformed
        );
    }

    #[test]
    fn test_well_formed_token_accepted() {
        let value = "ab".repeat(32);
        let headers = headers_with(CSRF_TOKEN_HEADER, &value);
        assert_eq!(header_token(&headers, CSRF_TOKEN_HEADER).unwrap(), value);
    }

    #[test]
    fn test_mutating_method_classification() {
        assert!(is_mutating(&Method::POST));
        assert!(is_mutating(&Method::PUT));
        assert!(is_mutating(&Method::DELETE));
        assert!(!is_mutating(&Method::GET));
        assert!(!is_mutating(&Method::HEAD));
        assert!(!is_mutating(&Method::OPTIONS));
    }

    #[test]
    fn test_csrf_error_responses_are_403() {
        for err in [
            CsrfError::TokenMissing,
            CsrfError::TokenMalformed,
            CsrfError::TokenInvalidOrExpired,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
        }
    }
}
