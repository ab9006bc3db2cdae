//! Runtime Configuration
//! Mission: Collect environment-driven settings in one place

use crate::csrf::store::{DEFAULT_SWEEP_INTERVAL, DEFAULT_TOKEN_EXPIRY};
use crate::middleware::RateLimitConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub auth_db_path: String,
    pub site_db_path: String,
    pub jwt_secret: String,
    pub session_lifetime_hours: i64,
    pub csrf_token_expiry: Duration,
    pub csrf_sweep_interval: Duration,
    pub csrf_enforce_client_binding: bool,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5001);

        let auth_db_path = resolve_data_path(env::var("AUTH_DB_PATH").ok(), "agencyport_auth.db");
        let site_db_path = resolve_data_path(env::var("SITE_DB_PATH").ok(), "agencyport_site.db");

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());

        let session_lifetime_hours = env::var("SESSION_LIFETIME_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(24);

        let csrf_token_expiry = env::var("CSRF_TOKEN_EXPIRY_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        let csrf_sweep_interval = env::var("CSRF_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SWEEP_INTERVAL);

        let csrf_enforce_client_binding = env::var("CSRF_ENFORCE_CLIENT_BINDING")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false);

        Self {
            port,
            auth_db_path,
            site_db_path,
            jwt_secret,
            session_lifetime_hours,
            csrf_token_expiry,
            csrf_sweep_interval,
            csrf_enforce_client_binding,
            rate_limit: RateLimitConfig::from_env(),
        }
    }
}

/// Resolve a data file path, anchoring relative paths at the crate root so
/// running from another working directory never creates a stray database.
fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return base.join(default_filename).to_string_lossy().to_string();
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    base.join(p).to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_anchor_at_crate_root() {
        let resolved = resolve_data_path(Some("data/site.db".to_string()), "default.db");
        assert!(resolved.ends_with("data/site.db"));
        assert!(PathBuf::from(&resolved).is_absolute());
    }

    #[test]
    fn test_absolute_paths_pass_through() {
        let resolved = resolve_data_path(Some("/tmp/site.db".to_string()), "default.db");
        assert_eq!(resolved, "/tmp/site.db");
    }

    #[test]
    fn test_blank_env_value_falls_back() {
        let resolved = resolve_data_path(Some("  ".to_string()), "default.db");
        assert!(resolved.ends_with("default.db"));
    }
}
