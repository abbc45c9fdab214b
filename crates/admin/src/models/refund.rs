//! Refund models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::{OrderId, Price, RefundId, RefundStatus, UserId};

/// A refund raised against an order.
///
/// Refund state is independent of the order's lifecycle status; completing
/// a refund only moves the order's payment status to refunded.
#[derive(Debug, Clone, Serialize)]
pub struct Refund {
    pub id: RefundId,
    pub order_id: OrderId,
    pub amount: Price,
    pub reason: Option<String>,
    pub status: RefundStatus,
    /// Back-office user who raised the refund; `None` once that account has
    /// been deleted.
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of the refund listing.
#[derive(Debug, Clone, Serialize)]
pub struct RefundPage {
    pub refunds: Vec<Refund>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}
