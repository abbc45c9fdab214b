//! Refund repository.
//!
//! A refund never exceeds its order's total, and completing one moves the
//! order's payment status to refunded in the same transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use aurelia_core::{CurrencyCode, OrderId, Price, RefundId, RefundStatus, UserId};

use super::{RepositoryError, clamp_page, parse_stored};
use crate::models::refund::{Refund, RefundPage};

const REFUND_COLUMNS: &str =
    "id, order_id, amount, currency, reason, status, created_by, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct RefundRow {
    id: i32,
    order_id: i32,
    amount: Decimal,
    currency: String,
    reason: Option<String>,
    status: String,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RefundRow> for Refund {
    type Error = RepositoryError;

    fn try_from(row: RefundRow) -> Result<Self, Self::Error> {
        let currency = parse_stored(&row.currency)?;
        Ok(Self {
            id: RefundId::new(row.id),
            order_id: OrderId::new(row.order_id),
            amount: Price::new(row.amount, currency),
            reason: row.reason,
            status: parse_stored::<RefundStatus>(&row.status)?,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Refunds attached to one order, oldest first.
pub(super) async fn refunds_for_order(
    pool: &PgPool,
    order_id: OrderId,
) -> Result<Vec<Refund>, RepositoryError> {
    let sql = format!(
        "SELECT {REFUND_COLUMNS} FROM shop.refunds WHERE order_id = $1 ORDER BY id"
    );
    let rows = sqlx::query_as::<_, RefundRow>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

/// Listing filters for refunds.
#[derive(Debug, Default, Clone)]
pub struct RefundFilter {
    pub status: Option<RefundStatus>,
    pub order_id: Option<OrderId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl RefundFilter {
    fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            builder.push(" AND status = ").push_bind(status.to_string());
        }
        if let Some(order_id) = self.order_id {
            builder.push(" AND order_id = ").push_bind(order_id);
        }
        if let Some(from) = self.from {
            builder.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = self.to {
            builder.push(" AND created_at <= ").push_bind(to);
        }
    }
}

/// Repository for refunds.
pub struct RefundRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RefundRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Raise a refund against an order.
    ///
    /// The amount is capped at the order's total across all of that order's
    /// refunds combined; the check and the insert run in one transaction so
    /// two concurrent refunds cannot overshoot together.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist and
    /// `Conflict` when the amount would exceed the remaining refundable
    /// total.
    pub async fn create(
        &self,
        order_id: OrderId,
        amount: Decimal,
        reason: Option<&str>,
        created_by: UserId,
    ) -> Result<Refund, RepositoryError> {
        if amount <= Decimal::ZERO {
            return Err(RepositoryError::Conflict(
                "refund amount must be positive".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let order: Option<(Decimal, String)> =
            sqlx::query_as("SELECT total, currency FROM shop.orders WHERE id = $1 FOR UPDATE")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (total, currency) = order.ok_or(RepositoryError::NotFound)?;
        let currency = parse_stored::<CurrencyCode>(&currency)?;

        let (already_refunded,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM shop.refunds
             WHERE order_id = $1 AND status != 'rejected'",
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_refunded + amount > total {
            return Err(RepositoryError::Conflict(format!(
                "refund amount exceeds the remaining refundable total of {}",
                total - already_refunded
            )));
        }

        let sql = format!(
            "INSERT INTO shop.refunds (order_id, amount, currency, reason, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {REFUND_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RefundRow>(&sql)
            .bind(order_id)
            .bind(amount)
            .bind(currency.code())
            .bind(reason)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        row.try_into()
    }

    /// List refunds newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &RefundFilter,
        page: u32,
        per_page: u32,
    ) -> Result<RefundPage, RepositoryError> {
        let (page, per_page, offset) = clamp_page(page, per_page);

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {REFUND_COLUMNS} FROM shop.refunds WHERE true"
        ));
        filter.apply(&mut builder);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(per_page))
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = builder
            .build_query_as::<RefundRow>()
            .fetch_all(self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM shop.refunds WHERE true",
        );
        filter.apply(&mut count);
        let (total,): (i64,) = count.build_query_as().fetch_one(self.pool).await?;

        let refunds = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RefundPage {
            refunds,
            total,
            page,
            per_page,
        })
    }

    /// Fetch one refund.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: RefundId) -> Result<Option<Refund>, RepositoryError> {
        let sql = format!("SELECT {REFUND_COLUMNS} FROM shop.refunds WHERE id = $1");
        let row = sqlx::query_as::<_, RefundRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Set a refund's status.
    ///
    /// Moving to `Completed` also sets the order's payment status to
    /// refunded, in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the refund does not exist.
    pub async fn set_status(
        &self,
        id: RefundId,
        status: RefundStatus,
    ) -> Result<Refund, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE shop.refunds SET status = $2, updated_at = now()
             WHERE id = $1 RETURNING {REFUND_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RefundRow>(&sql)
            .bind(id)
            .bind(status.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        if status == RefundStatus::Completed {
            sqlx::query(
                "UPDATE shop.orders SET payment_status = 'refunded', updated_at = now()
                 WHERE id = $1",
            )
            .bind(row.order_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        row.try_into()
    }

    /// All refunds matching a filter, unpaginated, for CSV export.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self, filter: &RefundFilter) -> Result<Vec<Refund>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {REFUND_COLUMNS} FROM shop.refunds WHERE true"
        ));
        filter.apply(&mut builder);
        builder.push(" ORDER BY created_at DESC, id DESC");
        let rows = builder
            .build_query_as::<RefundRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
