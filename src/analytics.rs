//! Visit Recording
//! Mission: Append page visits to the visitor log
//!
//! Recording only; aggregation queries live outside this service.

use anyhow::Result;
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

/// Visitor log with SQLite backend
pub struct VisitStore {
    db_path: String,
}

impl VisitStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS visitor_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ip_address TEXT,
                user_agent TEXT,
                page_visited TEXT,
                visited_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn record(&self, ip: &str, user_agent: &str, page: &str) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO visitor_stats (ip_address, user_agent, page_visited, visited_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![ip, user_agent, page, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Number of recorded visits (tests and diagnostics).
    pub fn count(&self) -> Result<i64> {
        let conn = Connection::open(&self.db_path)?;
        let count = conn.query_row("SELECT COUNT(*) FROM visitor_stats", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[derive(Debug, Deserialize)]
pub struct VisitRequest {
    pub page_visited: Option<String>,
}

/// Record a page visit - POST /api/analytics/visit (public, CSRF-exempt)
pub async fn record_visit(
    State(store): State<Arc<VisitStore>>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<VisitRequest>,
) -> Response {
    let ip = connect_info
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    let page = payload.page_visited.as_deref().unwrap_or("unknown");

    match store.record(&ip, user_agent, page) {
        Ok(()) => Json(json!({ "message": "Visit recorded" })).into_response(),
        Err(e) => {
            warn!("Failed to record visit: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal server error" })),
            )
                .into_response()
        }
    }
}
