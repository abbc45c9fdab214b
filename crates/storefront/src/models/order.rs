//! Order models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::{OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, ProductId, UserId};

use super::address::ShippingAddress;

/// An order created from cart contents at checkout.
///
/// `status` and `payment_status` are independent; only payment verification
/// moves `payment_status` to completed, and only refund completion moves it
/// to refunded.
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
    pub shipping_address: ShippingAddress,
    /// Set once the payment gateway order has been created.
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

/// An order with its lines, as returned by detail endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
