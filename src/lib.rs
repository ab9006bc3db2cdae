//! Agency Portfolio Backend Library
//!
//! Exposes the security core (CSRF token store, session token codec,
//! auth middleware) and the content modules for use by the binary and
//! the integration tests.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod csrf;
pub mod middleware;
pub mod projects;
pub mod router;
