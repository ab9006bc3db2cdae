//! CSRF Challenge Endpoint
//! Mission: Hand out fresh one-time challenge pairs to clients

use crate::csrf::store::CsrfTokenStore;
use axum::{
    extract::{ConnectInfo, Request, State},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Response body for GET /api/csrf-token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
    pub session_token: String,
}

/// Issue a fresh CSRF challenge pair - GET /api/csrf-token (public)
pub async fn issue_csrf_token(
    State(store): State<Arc<CsrfTokenStore>>,
    req: Request,
) -> Json<CsrfTokenResponse> {
    let client_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let (session_token, csrf_token) = store.issue(&client_addr);

    Json(CsrfTokenResponse {
        csrf_token,
        session_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_uses_camel_case_keys() {
        let body = CsrfTokenResponse {
            csrf_token: "a".repeat(64),
            session_token: "b".repeat(64),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("csrfToken").is_some());
        assert!(json.get("sessionToken").is_some());
    }
}
