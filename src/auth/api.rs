//! Authentication API Endpoints
//! Mission: Provide admin login and identity endpoints

use crate::auth::{
    middleware::extract_claims,
    models::{LoginRequest, LoginResponse, UserResponse},
    token::SessionTokenCodec,
    user_store::UserStore,
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub codec: Arc<dyn SessionTokenCodec>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, codec: Arc<dyn SessionTokenCodec>) -> Self {
        Self { user_store, codec }
    }
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("🔐 Login attempt: {}", payload.username);

    // Unknown username and wrong password both come back as None; the
    // response is identical either way.
    let user = state
        .user_store
        .verify_login(&payload.username, &payload.password)
        .map_err(|e| {
            warn!("Credential lookup failed: {}", e);
            AuthApiError::InternalError
        })?
        .ok_or_else(|| {
            warn!("❌ Failed login attempt: {}", payload.username);
            AuthApiError::InvalidCredentials
        })?;

    let (token, expires_in) = state
        .codec
        .issue(&user)
        .map_err(|_| AuthApiError::InternalError)?;

    info!("✅ Login successful: {} ({})", user.username, user.role.as_str());

    Ok(Json(LoginResponse {
        token,
        expires_in,
        role: user.role,
        user: UserResponse::from_user(&user),
    }))
}

/// Get current identity - GET /api/auth/me
/// Built entirely from the verified claims; no database lookup.
pub async fn get_current_user(req: Request) -> Result<Json<UserResponse>, AuthApiError> {
    let claims = extract_claims(&req).ok_or(AuthApiError::Unauthorized)?;

    Ok(Json(UserResponse {
        id: claims.sub.clone(),
        username: claims.username.clone(),
        role: claims.role,
        created_at: String::new(),
    }))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    Unauthorized,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_api_error_responses() {
        let invalid_creds = AuthApiError::InvalidCredentials.into_response();
        assert_eq!(invalid_creds.status(), StatusCode::UNAUTHORIZED);

        let unauthorized = AuthApiError::Unauthorized.into_response();
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

        let internal = AuthApiError::InternalError.into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
