//! Wishlist model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::{Price, ProductId, WishlistItemId};

/// A wishlist entry joined with product data.
///
/// Unique per (user, product); adding the same product twice is a no-op.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}
