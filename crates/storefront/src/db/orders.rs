//! Order repository: checkout writes and account order history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use aurelia_core::{
    CurrencyCode, OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, ProductId, UserId,
};

use super::{RepositoryError, parse_stored};
use crate::models::address::ShippingAddress;
use crate::models::cart::CartLine;
use crate::models::order::{Order, OrderDetail, OrderItem};

const ORDER_COLUMNS: &str = "id, order_number, user_id, email, status, payment_status,
     subtotal, shipping, total, currency, shipping_address, gateway_order_id,
     created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: i32,
    email: String,
    status: String,
    payment_status: String,
    subtotal: Decimal,
    shipping: Decimal,
    total: Decimal,
    currency: String,
    shipping_address: serde_json::Value,
    gateway_order_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let currency = parse_stored::<CurrencyCode>(&row.currency)?;
        let shipping_address: ShippingAddress = serde_json::from_value(row.shipping_address)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("bad shipping address json: {e}"))
            })?;
        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            user_id: UserId::new(row.user_id),
            email: row.email,
            status: parse_stored::<OrderStatus>(&row.status)?,
            payment_status: parse_stored::<PaymentStatus>(&row.payment_status)?,
            subtotal: Price::new(row.subtotal, currency),
            shipping: Price::new(row.shipping, currency),
            total: Price::new(row.total, currency),
            shipping_address,
            gateway_order_id: row.gateway_order_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl OrderItemRow {
    fn into_item(self, currency: CurrencyCode) -> Result<OrderItem, RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity on order item {}",
                self.id
            ))
        })?;
        Ok(OrderItem {
            id: OrderItemId::new(self.id),
            order_id: OrderId::new(self.order_id),
            product_id: ProductId::new(self.product_id),
            name: self.name,
            unit_price: Price::new(self.unit_price, currency),
            quantity,
        })
    }
}

/// Repository for orders and their snapshotted lines.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending order from cart lines, snapshotting product data.
    ///
    /// The cart itself is left untouched until payment verification
    /// succeeds, so an abandoned checkout loses nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the cart is empty or a total
    /// overflows.
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
        email: &str,
        lines: &[CartLine],
        shipping: Price,
        address: &ShippingAddress,
    ) -> Result<Order, RepositoryError> {
        if lines.is_empty() {
            return Err(RepositoryError::Conflict("cart is empty".to_string()));
        }
        let currency = shipping.currency;
        let subtotal = lines
            .iter()
            .try_fold(Price::zero(currency), |acc, line| {
                acc.checked_add(&line.line_total)
            })
            .ok_or_else(|| RepositoryError::Conflict("order total overflow".to_string()))?;
        let total = subtotal
            .checked_add(&shipping)
            .ok_or_else(|| RepositoryError::Conflict("order total overflow".to_string()))?;
        let address_json = serde_json::to_value(address)
            .map_err(|e| RepositoryError::DataCorruption(format!("address encode: {e}")))?;
        let order_number = format!("ORD-{:08}", rand::random::<u32>() % 100_000_000);

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO shop.orders
                 (order_number, user_id, email, subtotal, shipping, total,
                  currency, shipping_address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(&order_number)
            .bind(user_id)
            .bind(email)
            .bind(subtotal.amount)
            .bind(shipping.amount)
            .bind(total.amount)
            .bind(currency.code())
            .bind(&address_json)
            .fetch_one(&mut *tx)
            .await?;

        for line in lines {
            sqlx::query(
                "INSERT INTO shop.order_items (order_id, product_id, name, unit_price, quantity)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(row.id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.unit_price.amount)
            .bind(i32::try_from(line.quantity).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        row.try_into()
    }

    /// Record the payment gateway's order id against a pending order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not belong to
    /// the user or is not pending payment.
    pub async fn set_gateway_order(
        &self,
        id: OrderId,
        user_id: UserId,
        gateway_order_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.orders SET gateway_order_id = $3, updated_at = now()
             WHERE id = $1 AND user_id = $2 AND payment_status = 'pending'",
        )
        .bind(id)
        .bind(user_id)
        .bind(gateway_order_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Look up the order a gateway order id belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_gateway_order(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql =
            format!("SELECT {ORDER_COLUMNS} FROM shop.orders WHERE gateway_order_id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(gateway_order_id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Mark an order paid and confirmed, and clear the payer's cart, in one
    /// transaction. Only a verified payment signature reaches this.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not pending
    /// payment for this user.
    pub async fn complete_payment(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE shop.orders
             SET payment_status = 'completed', status = 'confirmed', updated_at = now()
             WHERE id = $1 AND user_id = $2 AND payment_status = 'pending'
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM shop.cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        row.try_into()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Fetch one of the user's orders with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let sql =
            format!("SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1 AND user_id = $2");
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        let order: Order = row.try_into()?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, name, unit_price, quantity
             FROM shop.order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let currency = order.total.currency;
        let items = items
            .into_iter()
            .map(|r| r.into_item(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(OrderDetail { order, items }))
    }
}
