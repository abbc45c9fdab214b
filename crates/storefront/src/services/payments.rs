//! Payment gateway client for hosted checkout.
//!
//! The storefront creates a gateway order server-side, the browser completes
//! payment against the gateway's hosted page, and the gateway hands back a
//! `(order_id, payment_id, signature)` triple. The signature is an
//! HMAC-SHA256 over `"{order_id}|{payment_id}"` keyed with the API secret;
//! an order is only ever marked paid after that signature checks out here.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::instrument;

use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors from the payment gateway client.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP transport failure.
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gateway rejected the request.
    #[error("gateway error ({status}): {message}")]
    Gateway {
        status: reqwest::StatusCode,
        message: String,
    },

    /// The amount cannot be expressed in minor units.
    #[error("amount out of range")]
    AmountOutOfRange,
}

/// An order as created on the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    #[serde(default)]
    description: String,
}

/// Payment gateway API client.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<GatewayClientInner>,
}

struct GatewayClientInner {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: SecretString,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed.
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(GatewayClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                key_id: config.key_id.clone(),
                key_secret: config.key_secret.clone(),
            }),
        }
    }

    /// Create a gateway order for the given amount in minor units.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Gateway` if the gateway rejects the request.
    #[instrument(skip(self), fields(receipt))]
    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, PaymentError> {
        let request = CreateOrderRequest {
            amount: amount_minor,
            currency,
            receipt,
        };

        let response = self
            .inner
            .client
            .post(format!("{}/orders", self.inner.base_url))
            .basic_auth(
                &self.inner.key_id,
                Some(self.inner.key_secret.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<GatewayErrorBody>()
                .await
                .map(|b| b.description)
                .unwrap_or_default();
            return Err(PaymentError::Gateway { status, message });
        }

        Ok(response.json().await?)
    }

    /// Check a hosted-checkout callback signature against our secret.
    #[must_use]
    pub fn verify_signature(
        &self,
        gateway_order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> bool {
        verify_payment_signature(
            self.inner.key_secret.expose_secret(),
            gateway_order_id,
            payment_id,
            signature,
        )
    }
}

/// Compute the expected hosted-checkout signature.
fn payment_signature(secret: &str, gateway_order_id: &str, payment_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison of the callback signature with the expected one.
#[must_use]
pub fn verify_payment_signature(
    secret: &str,
    gateway_order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    payment_signature(secret, gateway_order_id, payment_id).is_some_and(|expected| {
        bool::from(expected.as_bytes().ct_eq(signature.as_bytes()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key";

    #[test]
    fn test_signature_verifies() {
        let sig = payment_signature(SECRET, "order_abc", "pay_123").unwrap();
        assert!(verify_payment_signature(SECRET, "order_abc", "pay_123", &sig));
    }

    #[test]
    fn test_tampered_payment_id_rejected() {
        let sig = payment_signature(SECRET, "order_abc", "pay_123").unwrap();
        assert!(!verify_payment_signature(SECRET, "order_abc", "pay_999", &sig));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let sig = payment_signature("other_secret", "order_abc", "pay_123").unwrap();
        assert!(!verify_payment_signature(SECRET, "order_abc", "pay_123", &sig));
    }

    #[test]
    fn test_garbage_signature_rejected() {
        assert!(!verify_payment_signature(
            SECRET,
            "order_abc",
            "pay_123",
            "not-a-signature"
        ));
    }
}
