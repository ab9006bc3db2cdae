//! CSRF Protection Module
//! Mission: One-time challenge tokens guarding every mutating request

pub mod api;
pub mod middleware;
pub mod store;

pub use middleware::{csrf_protection, CsrfError, CSRF_SESSION_HEADER, CSRF_TOKEN_HEADER};
pub use store::{CsrfTokenStore, DEFAULT_SWEEP_INTERVAL, DEFAULT_TOKEN_EXPIRY};
