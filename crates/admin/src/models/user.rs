//! User models as the back-office sees them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::{Email, Role, UserId};

/// A user account, shopper or back-office.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of the user listing.
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}
