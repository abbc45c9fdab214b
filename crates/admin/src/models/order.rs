//! Order models as the back-office sees them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::{OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, ProductId, UserId};

use super::refund::Refund;

/// An order row across all shoppers.
///
/// `shipping_address` is carried as the stored JSON document; the admin
/// renders it verbatim and never edits it.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    pub shipping_address: serde_json::Value,
    pub gateway_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A snapshotted order line.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
}

/// An order with its lines and refund history.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub refunds: Vec<Refund>,
}

/// One page of the order listing.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}
