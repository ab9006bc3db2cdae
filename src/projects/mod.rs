//! Portfolio Projects Module
//! Mission: Public project listings plus admin-gated CRUD

pub mod api;
pub mod store;

pub use store::{Project, ProjectInput, ProjectStore};
