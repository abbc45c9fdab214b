//! Account cart repository.
//!
//! Writes hold the one-row-per-(user, product) invariant with upserts on
//! the unique constraint, and login-time merge runs in a transaction with
//! the account's rows locked so two concurrent syncs cannot double-apply
//! the guest quantities.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use aurelia_core::{CartItemId, CurrencyCode, Price, ProductId, UserId};

use super::{RepositoryError, parse_stored};
use crate::models::cart::{CartLine, GuestCart, merge_quantities};

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    product_id: i32,
    name: String,
    image: Option<String>,
    price: Decimal,
    currency: String,
    quantity: i32,
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let currency = parse_stored::<CurrencyCode>(&row.currency)?;
        let unit_price = Price::new(row.price, currency);
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative cart quantity for product {}",
                row.product_id
            ))
        })?;
        let line_total = unit_price.checked_mul(quantity).ok_or_else(|| {
            RepositoryError::DataCorruption("cart line total overflow".to_string())
        })?;
        Ok(Self {
            id: CartItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            name: row.name,
            image: row.image,
            unit_price,
            quantity,
            line_total,
        })
    }
}

/// Repository for the logged-in shopper's cart.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the cart joined with product data, oldest line first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT ci.id, ci.product_id, p.name, p.price, p.currency, ci.quantity,
                    ci.updated_at,
                    (SELECT pi.url FROM shop.product_images pi
                     WHERE pi.product_id = p.id ORDER BY pi.position, pi.id LIMIT 1) AS image
             FROM shop.cart_items ci
             JOIN shop.products p ON p.id = ci.product_id
             WHERE ci.user_id = $1
             ORDER BY ci.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Add a quantity of a product. An existing line absorbs the quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist or
    /// is not active.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        if quantity == 0 {
            return Ok(());
        }
        let result = sqlx::query(
            "INSERT INTO shop.cart_items (user_id, product_id, quantity)
             SELECT $1, p.id, $3 FROM shop.products p
             WHERE p.id = $2 AND p.status = 'active'
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET quantity = shop.cart_items.quantity + EXCLUDED.quantity,
                           updated_at = now()",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set the quantity of a product's line. Non-positive removes the line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        match i32::try_from(quantity) {
            Ok(q) if q > 0 => {
                sqlx::query(
                    "UPDATE shop.cart_items SET quantity = $3, updated_at = now()
                     WHERE user_id = $1 AND product_id = $2",
                )
                .bind(user_id)
                .bind(product_id)
                .bind(q)
                .execute(self.pool)
                .await?;
            }
            _ => self.remove(user_id, product_id).await?,
        }
        Ok(())
    }

    /// Remove one product's line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Drop the whole cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Merge a guest cart into the account cart, summing quantities for
    /// products present in both. Runs in one transaction with the account's
    /// rows locked, so replaying the same merge (or racing a concurrent
    /// login) cannot double-count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn merge_guest_cart(
        &self,
        user_id: UserId,
        guest: &GuestCart,
    ) -> Result<(), RepositoryError> {
        if guest.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let account: Vec<(i32, i32)> = sqlx::query_as(
            "SELECT product_id, quantity FROM shop.cart_items
             WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let account: Vec<(ProductId, u32)> = account
            .into_iter()
            .map(|(pid, qty)| (ProductId::new(pid), u32::try_from(qty).unwrap_or(0)))
            .collect();
        let merged = merge_quantities(&account, guest.lines());

        for (product_id, quantity) in merged {
            if quantity == 0 {
                continue;
            }
            sqlx::query(
                "INSERT INTO shop.cart_items (user_id, product_id, quantity)
                 SELECT $1, p.id, $3 FROM shop.products p
                 WHERE p.id = $2 AND p.status = 'active'
                 ON CONFLICT (user_id, product_id)
                 DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()",
            )
            .bind(user_id)
            .bind(product_id)
            .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
