//! Status enums for orders, payments, refunds, and assistant sessions.
//!
//! All of these are stored as `TEXT` in Postgres and converted through
//! `Display`/`FromStr` at the repository boundary, so a bad database value
//! surfaces as data corruption instead of a silent default.

use serde::{Deserialize, Serialize};

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $text)),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($name), ": {}"), s)),
                }
            }
        }
    };
}

/// Order lifecycle status.
///
/// The back-office may set any value; no transition machine is enforced
/// (matching the documented behavior of the system this replaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

text_enum!(OrderStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

/// Payment status, independent of [`OrderStatus`].
///
/// Only payment verification moves this to `Completed`, and only refund
/// completion moves it to `Refunded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

text_enum!(PaymentStatus {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
    Refunded => "refunded",
});

/// Refund lifecycle status, independent of the order's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Rejected,
}

text_enum!(RefundStatus {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Rejected => "rejected",
});

/// Product visibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Archived,
}

text_enum!(ProductStatus {
    Active => "active",
    Archived => "archived",
});

/// Saved-address tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    #[default]
    Shipping,
    Billing,
    Both,
}

text_enum!(AddressKind {
    Shipping => "shipping",
    Billing => "billing",
    Both => "both",
});

/// Author of a design-session message. The log is append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

text_enum!(MessageRole {
    User => "user",
    Assistant => "assistant",
});

/// Lifecycle of a conversational-video session.
///
/// `Requested → Active | Failed`; a failed session may be retried with the
/// same language, an active one may be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoSessionState {
    #[default]
    Requested,
    Active,
    Failed,
    Closed,
}

text_enum!(VideoSessionState {
    Requested => "requested",
    Active => "active",
    Failed => "failed",
    Closed => "closed",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("returned".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_status_roundtrip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(
                status.to_string().parse::<PaymentStatus>().unwrap(),
                status
            );
        }
    }

    #[test]
    fn test_refund_status_roundtrip() {
        for status in [
            RefundStatus::Pending,
            RefundStatus::Processing,
            RefundStatus::Completed,
            RefundStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse::<RefundStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&VideoSessionState::Requested).unwrap(),
            "\"requested\""
        );
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
