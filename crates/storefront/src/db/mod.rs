//! Database operations for the shop schema.
//!
//! # Tables (schema `shop`)
//!
//! - `users` - Shopper accounts and the role column
//! - `products`, `product_images`, `product_videos` - Catalog
//! - `cart_items` - Account carts (one row per user+product)
//! - `wishlists`, `addresses`
//! - `orders`, `order_items`, `refunds`
//! - `design_sessions`, `design_messages`, `video_sessions`
//! - `newsletter_subscribers`, `support_chat_logs`, `support_alerts`
//!
//! All queries are runtime-checked (`sqlx::query_as` over explicit row
//! structs) so the workspace builds without a live database. Row structs
//! convert into domain models via `TryFrom`, surfacing bad stored enum
//! values as [`RepositoryError::DataCorruption`].
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p aurelia-cli -- migrate
//! ```

pub mod addresses;
pub mod cart;
pub mod design;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod support;
pub mod users;
pub mod video;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use cart::CartRepository;
pub use design::DesignRepository;
pub use newsletter::NewsletterRepository;
pub use orders::OrderRepository;
pub use products::{CatalogFilter, ProductRepository};
pub use support::SupportRepository;
pub use users::UserRepository;
pub use video::VideoSessionRepository;
pub use wishlist::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., the favorite cap or a unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Parse a stored enum column, mapping bad values to data corruption.
pub(crate) fn parse_stored<T>(value: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| RepositoryError::DataCorruption(e))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
