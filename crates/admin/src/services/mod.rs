//! Services for the admin crate.

pub mod auth;
pub mod storage;

pub use auth::{AuthError, AuthService};
pub use storage::{MediaKind, StorageError, StorageService};
