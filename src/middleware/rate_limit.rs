//! Rate limiting middleware.
//!
//! Fixed-window rate limiting per IP address, in memory. Mirrors the
//! limits the site previously applied at the API boundary.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Configuration for rate limiting.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    /// Read limits from RATE_LIMIT_MAX / RATE_LIMIT_WINDOW_SECS.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_requests = env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(defaults.max_requests);
        let window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(defaults.window.as_secs());

        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Rate limiter state tracking requests per IP.
#[derive(Clone)]
pub struct RateLimitLayer {
    config: RateLimitConfig,
    state: Arc<Mutex<HashMap<IpAddr, WindowEntry>>>,
}

struct WindowEntry {
    count: u32,
    window_start: Instant,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check if a request from this IP should be allowed.
    fn check(&self, ip: IpAddr) -> Option<Duration> {
        let mut state = self.state.lock();
        let now = Instant::now();

        let entry = state.entry(ip).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        if entry.count > self.config.max_requests {
            let reset_at = entry.window_start + self.config.window;
            Some(reset_at.duration_since(now))
        } else {
            None
        }
    }

    /// Drop stale windows (call from a background task).
    pub fn cleanup(&self) {
        let mut state = self.state.lock();
        let now = Instant::now();
        let window = self.config.window;

        state.retain(|_, entry| now.duration_since(entry.window_start) < window * 2);
    }

    /// Spawn the periodic cleanup task.
    pub fn spawn_cleanup(limiter: RateLimitLayer, period: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.cleanup();
            }
        });
    }
}

/// Rate limiting middleware function.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimitLayer>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Only guard the API surface.
    if !request.uri().path().starts_with("/api/") {
        return next.run(request).await;
    }

    let Some(ip) = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
    else {
        // No connection info (e.g. in-process tests): nothing to key on.
        return next.run(request).await;
    };

    match limiter.check(ip) {
        None => next.run(request).await,
        Some(retry_after) => {
            warn!(
                ip = %ip,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );

            let body = serde_json::json!({
                "message": "Too many requests, please try again later.",
                "retry_after_seconds": retry_after.as_secs(),
            });

            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after.as_secs().to_string())],
                axum::Json(body),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_under_limit() {
        let config = RateLimitConfig {
            max_requests: 10,
            window: Duration::from_secs(60),
        };
        let limiter = RateLimitLayer::new(config);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..10 {
            assert!(limiter.check(ip).is_none());
        }
    }

    #[test]
    fn test_rejects_over_limit() {
        let config = RateLimitConfig {
            max_requests: 5,
            window: Duration::from_secs(60),
        };
        let limiter = RateLimitLayer::new(config);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..5 {
            assert!(limiter.check(ip).is_none());
        }

        let retry_after = limiter.check(ip);
        assert!(retry_after.is_some());
        assert!(retry_after.unwrap() <= Duration::from_secs(60));
    }

    #[test]
    fn test_limits_are_per_ip() {
        let config = RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        };
        let limiter = RateLimitLayer::new(config);

        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(a).is_none());
        assert!(limiter.check(a).is_some());
        assert!(limiter.check(b).is_none());
    }

    #[test]
    fn test_cleanup_drops_stale_windows() {
        let config = RateLimitConfig {
            max_requests: 5,
            window: Duration::from_millis(1),
        };
        let limiter = RateLimitLayer::new(config);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        limiter.check(ip);
        std::thread::sleep(Duration::from_millis(5));
        limiter.cleanup();

        assert!(limiter.state.lock().is_empty());
    }
}
