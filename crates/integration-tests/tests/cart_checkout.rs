//! Integration tests for the cart and the checkout wizard.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p aurelia-storefront)
//! - At least one active product in the catalog (aurelia-cli seed)

use reqwest::StatusCode;
use serde_json::{Value, json};

use integration_tests::{client, register_shopper, storefront_base_url};

/// First active product id from the catalog.
async fn any_product_id(client: &reqwest::Client) -> i64 {
    let body: Value = client
        .get(format!("{}/products", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse product list");
    body["products"][0]["id"]
        .as_i64()
        .expect("catalog is empty; run `aurelia-cli seed` first")
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_guest_cart_merges_on_register() {
    let client = client();
    let base_url = storefront_base_url();
    let product_id = any_product_id(&client).await;

    // Add to the guest cart before having an account
    let resp = client
        .post(format!("{base_url}/cart/items"))
        .json(&json!({ "product_id": product_id, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to add to guest cart");
    assert_eq!(resp.status(), StatusCode::OK);

    // Register; the guest cart must follow the account
    register_shopper(&client).await;

    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to read cart")
        .json()
        .await
        .expect("Failed to parse cart");
    let lines = cart["lines"].as_array().expect("cart has lines array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_requires_address_before_payment() {
    let client = client();
    let base_url = storefront_base_url();

    register_shopper(&client).await;
    let product_id = any_product_id(&client).await;

    client
        .post(format!("{base_url}/cart/items"))
        .json(&json!({ "product_id": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");

    // Payment step without an address is refused
    let resp = client
        .post(format!("{base_url}/checkout/payment/order"))
        .send()
        .await
        .expect("Failed to call payment step");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Incomplete address is refused and not stored
    let resp = client
        .post(format!("{base_url}/checkout/address"))
        .json(&json!({
            "name": "Priya Sharma",
            "phone": "",
            "address_line1": "14 Marine Drive",
            "city": "Mumbai",
            "state": "Maharashtra",
            "pincode": "400001"
        }))
        .send()
        .await
        .expect("Failed to submit address");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Valid address advances the wizard
    let resp = client
        .post(format!("{base_url}/checkout/address"))
        .json(&json!({
            "name": "Priya Sharma",
            "phone": "9876543210",
            "address_line1": "14 Marine Drive",
            "city": "Mumbai",
            "state": "Maharashtra",
            "pincode": "400001"
        }))
        .send()
        .await
        .expect("Failed to submit address");
    assert_eq!(resp.status(), StatusCode::OK);

    let state: Value = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to read checkout state")
        .json()
        .await
        .expect("Failed to parse checkout state");
    assert_eq!(state["address"]["city"], "Mumbai");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_forged_payment_signature_rejected() {
    let client = client();
    let base_url = storefront_base_url();

    register_shopper(&client).await;

    let resp = client
        .post(format!("{base_url}/checkout/payment/verify"))
        .json(&json!({
            "gateway_order_id": "order_nonexistent",
            "payment_id": "pay_nonexistent",
            "signature": "0000000000000000000000000000000000000000000000000000000000000000"
        }))
        .send()
        .await
        .expect("Failed to call verify");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
