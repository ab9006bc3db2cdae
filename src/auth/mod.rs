//! Authentication Module
//! Mission: Secure admin access with signed session tokens and a role gate

pub mod api;
pub mod middleware;
pub mod models;
pub mod token;
pub mod user_store;

pub use api::AuthState;
pub use middleware::{auth_middleware, require_admin};
pub use token::{HmacJwtCodec, SessionTokenCodec};
pub use user_store::UserStore;
