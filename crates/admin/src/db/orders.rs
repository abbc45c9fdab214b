//! Order repository: cross-shopper listing, detail, and status updates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use aurelia_core::{
    CurrencyCode, OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, ProductId, UserId,
};

use super::refunds::refunds_for_order;
use super::{RepositoryError, clamp_page, parse_stored};
use crate::models::order::{Order, OrderDetail, OrderItem, OrderPage};

const ORDER_COLUMNS: &str = "id, order_number, user_id, email, status, payment_status,
     subtotal, shipping, total, currency, shipping_address, gateway_order_id,
     created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OrderRow {
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
            shipping_address: row.shipping_address,
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

/// Listing filters for orders.
///
/// All fields are conjunctive; `search` matches the order number or the
/// snapshotted email, case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

impl OrderFilter {
    fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            builder.push(" AND status = ").push_bind(status.to_string());
        }
        if let Some(payment_status) = self.payment_status {
            builder
                .push(" AND payment_status = ")
                .push_bind(payment_status.to_string());
        }
        if let Some(from) = self.from {
            builder.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = self.to {
            builder.push(" AND created_at <= ").push_bind(to);
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", search.replace(['%', '_'], ""));
            builder
                .push(" AND (order_number ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

/// Repository for orders as the back-office manages them.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders across all shoppers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: u32,
        per_page: u32,
    ) -> Result<OrderPage, RepositoryError> {
        let (page, per_page, offset) = clamp_page(page, per_page);

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE true"
        ));
        filter.apply(&mut builder);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(per_page))
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = builder
            .build_query_as::<OrderRow>()
            .fetch_all(self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM shop.orders WHERE true",
        );
        filter.apply(&mut count);
        let (total,): (i64,) = count.build_query_as().fetch_one(self.pool).await?;

        let orders = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderPage {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Fetch one order with its lines and refund history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        let order: Order = row.try_into()?;
        let currency = order.total.currency;

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, name, unit_price, quantity
             FROM shop.order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        let items = items
            .into_iter()
            .map(|r| r.into_item(currency))
            .collect::<Result<Vec<_>, _>>()?;

        let refunds = refunds_for_order(self.pool, id).await?;

        Ok(Some(OrderDetail {
            order,
            items,
            refunds,
        }))
    }

    /// Set an order's lifecycle status.
    ///
    /// Any status may be set; there is no transition machine. The payment
    /// status is deliberately not settable here, it only moves through
    /// payment verification and refund completion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            "UPDATE shop.orders SET status = $2, updated_at = now()
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(status.to_string())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// All orders matching a filter, unpaginated, for CSV export.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE true"
        ));
        filter.apply(&mut builder);
        builder.push(" ORDER BY created_at DESC, id DESC");
        let rows = builder
            .build_query_as::<OrderRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
