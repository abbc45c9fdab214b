//! Shopper account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::{Email, Role, UserId};

/// A shopper account.
///
/// The password hash never leaves the database layer; it is handled by the
/// auth service and is not part of this model.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
