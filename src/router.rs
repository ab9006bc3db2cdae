//! Application Router
//! Mission: Wire the middleware pipeline and route table

use crate::{
    analytics::{self, VisitStore},
    auth::{self, api as auth_api, auth_middleware, require_admin, AuthState, SessionTokenCodec},
    csrf::{self, CsrfTokenStore},
    middleware::{rate_limit_middleware, request_logging, RateLimitLayer},
    projects::{api as projects_api, ProjectStore},
};
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state handed to the router builder.
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<auth::UserStore>,
    pub codec: Arc<dyn SessionTokenCodec>,
    pub csrf_store: Arc<CsrfTokenStore>,
    pub projects: Arc<ProjectStore>,
    pub visits: Arc<VisitStore>,
    pub rate_limiter: RateLimitLayer,
}

/// Build the full application router.
///
/// Request pipeline, outermost first: CORS, request logging, rate
/// limiting, CSRF protection, then per-route session verification and the
/// admin role gate before any mutating handler runs.
pub fn build_router(state: &AppState) -> Router {
    let auth_router = Router::new()
        .route("/api/auth/login", post(auth_api::login))
        .with_state(AuthState::new(
            state.user_store.clone(),
            state.codec.clone(),
        ));

    let me_router = Router::new()
        .route("/api/auth/me", get(auth_api::get_current_user))
        .route_layer(middleware::from_fn_with_state(
            state.codec.clone(),
            auth_middleware,
        ));

    let projects_admin = Router::new()
        .route("/api/projects", post(projects_api::create_project))
        .route(
            "/api/projects/:id",
            put(projects_api::update_project).delete(projects_api::delete_project),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.codec.clone(),
            auth_middleware,
        ));

    let projects_public = Router::new()
        .route("/api/projects", get(projects_api::list_projects))
        .route("/api/projects/featured", get(projects_api::list_featured))
        .route("/api/projects/:id", get(projects_api::get_project));

    let projects_router = projects_public
        .merge(projects_admin)
        .with_state(state.projects.clone());

    let csrf_router = Router::new()
        .route("/api/csrf-token", get(csrf::api::issue_csrf_token))
        .with_state(state.csrf_store.clone());

    let analytics_router = Router::new()
        .route("/api/analytics/visit", post(analytics::record_visit))
        .with_state(state.visits.clone());

    let public_routes = Router::new().route("/api/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(csrf_router)
        .merge(analytics_router)
        .merge(projects_router)
        .merge(auth_router)
        .merge(me_router)
        .layer(middleware::from_fn_with_state(
            state.csrf_store.clone(),
            csrf::csrf_protection,
        ))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

/// Health check - GET /api/health (public)
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    }))
}
