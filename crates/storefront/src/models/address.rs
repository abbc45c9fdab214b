//! Shipping address value object and saved addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use aurelia_core::{AddressId, AddressKind, UserId};

/// A shipping address as captured by the checkout wizard.
///
/// The wizard only advances past the address step when validation passes;
/// format validation (phone/pincode patterns) is intentionally not enforced,
/// only presence.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShippingAddress {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "address line 1 is required"))]
    pub address_line1: String,
    pub address_line2: Option<String>,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[validate(length(min = 1, message = "pincode is required"))]
    pub pincode: String,
}

fn default_country() -> String {
    "India".to_string()
}

/// A persisted, reusable address.
#[derive(Debug, Clone, Serialize)]
pub struct SavedAddress {
    pub id: AddressId,
    pub user_id: UserId,
    pub kind: AddressKind,
    /// True only for the user's first saved address.
    pub is_default: bool,
    #[serde(flatten)]
    pub address: ShippingAddress,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_address() -> ShippingAddress {
        ShippingAddress {
            name: "Priya Sharma".to_string(),
            phone: "9876543210".to_string(),
            address_line1: "14 Marine Drive".to_string(),
            address_line2: None,
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
            country: "India".to_string(),
            pincode: "400001".to_string(),
        }
    }

    #[test]
    fn test_valid_address_passes() {
        assert!(valid_address().validate().is_ok());
    }

    #[test]
    fn test_each_required_field_empty_fails() {
        for field in ["name", "phone", "address_line1", "city", "state", "pincode"] {
            let mut addr = valid_address();
            match field {
                "name" => addr.name.clear(),
                "phone" => addr.phone.clear(),
                "address_line1" => addr.address_line1.clear(),
                "city" => addr.city.clear(),
                "state" => addr.state.clear(),
                _ => addr.pincode.clear(),
            }
            assert!(addr.validate().is_err(), "{field} should be required");
        }
    }

    #[test]
    fn test_address_line2_is_optional() {
        let mut addr = valid_address();
        addr.address_line2 = None;
        assert!(addr.validate().is_ok());
        addr.address_line2 = Some("Flat 3B".to_string());
        assert!(addr.validate().is_ok());
    }
}
