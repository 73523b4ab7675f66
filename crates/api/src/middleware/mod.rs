//! Middleware and request extractors.

pub mod auth;
pub mod request_id;

pub use auth::RequireAdmin;
pub use request_id::request_id_middleware;
