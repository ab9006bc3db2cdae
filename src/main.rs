//! Agency Portfolio Backend
//! Mission: Serve the agency site API behind CSRF, session, and role gates

use agencyport_backend::{
    analytics::VisitStore,
    auth::{HmacJwtCodec, SessionTokenCodec, UserStore},
    config::AppConfig,
    csrf::CsrfTokenStore,
    middleware::RateLimitLayer,
    projects::ProjectStore,
    router::{build_router, AppState},
};
use anyhow::{Context, Result};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    info!("🚀 Agency Portfolio Backend starting");

    let config = AppConfig::from_env();

    let user_store = Arc::new(UserStore::new(&config.auth_db_path)?);
    info!("🔐 Credential store initialized at: {}", config.auth_db_path);

    let codec: Arc<dyn SessionTokenCodec> = Arc::new(HmacJwtCodec::with_lifetime(
        config.jwt_secret.clone(),
        config.session_lifetime_hours,
    ));

    let csrf_store = Arc::new(CsrfTokenStore::with_policy(
        config.csrf_token_expiry,
        config.csrf_enforce_client_binding,
    ));
    CsrfTokenStore::spawn_sweeper(csrf_store.clone(), config.csrf_sweep_interval);

    let projects = Arc::new(ProjectStore::new(&config.site_db_path)?);
    let visits = Arc::new(VisitStore::new(&config.site_db_path)?);
    info!("📊 Site database initialized at: {}", config.site_db_path);

    let rate_limiter = RateLimitLayer::new(config.rate_limit.clone());
    RateLimitLayer::spawn_cleanup(rate_limiter.clone(), Duration::from_secs(300));

    let state = AppState {
        user_store,
        codec,
        csrf_store,
        projects,
        visits,
        rate_limiter,
    };

    let app = build_router(&state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate-root .env (common when running with
    //    --manifest-path from elsewhere)
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agencyport_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
