//! Shared domain types.

mod email;
mod id;
mod price;
mod role;
mod status;

pub use email::{Email, EmailError};
pub use id::{
    AddressId, CartItemId, DesignMessageId, DesignSessionId, OrderId, OrderItemId, ProductId,
    RefundId, UserId, VideoSessionId, WishlistItemId,
};
pub use price::{CurrencyCode, Price};
pub use role::Role;
pub use status::{
    AddressKind, MessageRole, OrderStatus, PaymentStatus, ProductStatus, RefundStatus,
    VideoSessionState,
};
