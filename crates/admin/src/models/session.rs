//! Session-stored types and keys.

use serde::{Deserialize, Serialize};

use aurelia_core::{Email, Role, UserId};

/// Session-stored back-office identity.
///
/// The role is the one held at login time; handlers gate on it directly, so
/// a demoted admin keeps stale capabilities until the session expires or
/// they log out. The 24-hour session lifetime bounds that window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
}

/// Session keys for admin state.
pub mod keys {
    /// Key for storing the logged-in back-office user.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
