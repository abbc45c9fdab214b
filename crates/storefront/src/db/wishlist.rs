//! Wishlist repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use aurelia_core::{CurrencyCode, Price, ProductId, UserId, WishlistItemId};

use super::{RepositoryError, parse_stored};
use crate::models::wishlist::WishlistItem;

#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    id: i32,
    product_id: i32,
    name: String,
    price: Decimal,
    currency: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<WishlistRow> for WishlistItem {
    type Error = RepositoryError;

    fn try_from(row: WishlistRow) -> Result<Self, Self::Error> {
        let currency = parse_stored::<CurrencyCode>(&row.currency)?;
        Ok(Self {
            id: WishlistItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price: Price::new(row.price, currency),
            image: row.image,
            created_at: row.created_at,
        })
    }
}

/// Repository for per-user wishlists.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the wishlist joined with product data, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            "SELECT w.id, w.product_id, p.name, p.price, p.currency, w.created_at,
                    (SELECT pi.url FROM shop.product_images pi
                     WHERE pi.product_id = p.id ORDER BY pi.position, pi.id LIMIT 1) AS image
             FROM shop.wishlists w
             JOIN shop.products p ON p.id = w.product_id
             WHERE w.user_id = $1
             ORDER BY w.created_at DESC, w.id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Add a product. Adding a product already present is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist or
    /// is not active.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let exists: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM shop.products WHERE id = $1 AND status = 'active'")
                .bind(product_id)
                .fetch_optional(self.pool)
                .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "INSERT INTO shop.wishlists (user_id, product_id) VALUES ($1, $2)
             ON CONFLICT (user_id, product_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.wishlists WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
