//! Session-stored types and keys.

use serde::{Deserialize, Serialize};

use aurelia_core::{Email, Role, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in shopper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Role at login time; back-office capability checks re-read the
    /// database, this copy only gates shopper surfaces.
    pub role: Role,
}

/// Session keys for storefront state.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the guest cart of an unauthenticated shopper.
    pub const GUEST_CART: &str = "guest_cart";

    /// Key for the validated checkout shipping address.
    pub const CHECKOUT_ADDRESS: &str = "checkout_address";
}
