//! Middleware for the admin service.

pub mod auth;
pub mod session;

pub use auth::RequireBackOffice;
pub use session::create_session_layer;
