//! Integration tests for Aurelia.
//!
//! # Running Tests
//!
//! ```bash
//! # Run migrations and start both services
//! cargo run -p aurelia-cli -- migrate
//! cargo run -p aurelia-storefront &
//! cargo run -p aurelia-admin &
//!
//! # Run integration tests (ignored by default)
//! cargo test -p integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d so `cargo test` stays green without running
//! services. Each test registers its own throwaway account, so tests can
//! run against a shared dev database.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_TEST_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A cookie-keeping HTTP client, one session per client.
///
/// # Panics
///
/// Panics if the client cannot be built; fine in tests.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email for this test run.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.aureliajewels.in", Uuid::new_v4())
}

/// Register a shopper account and leave the client logged in.
///
/// Returns the registered email.
///
/// # Panics
///
/// Panics if registration fails.
pub async fn register_shopper(client: &Client) -> String {
    let email = unique_email("shopper");
    let resp = client
        .post(format!("{}/auth/register", storefront_base_url()))
        .json(&json!({ "email": email, "password": "integration-pass-1" }))
        .send()
        .await
        .expect("Failed to register");
    assert!(
        resp.status().is_success(),
        "registration failed: {}",
        resp.status()
    );
    email
}

/// Log a back-office user in on this client.
///
/// Credentials come from `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD`;
/// create the account first via `aurelia-cli admin create`.
///
/// # Panics
///
/// Panics if the environment variables are unset or login fails.
pub async fn login_admin(client: &Client) -> Value {
    let email = std::env::var("ADMIN_TEST_EMAIL").expect("ADMIN_TEST_EMAIL not set");
    let password = std::env::var("ADMIN_TEST_PASSWORD").expect("ADMIN_TEST_PASSWORD not set");

    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in");
    assert!(
        resp.status().is_success(),
        "admin login failed: {}",
        resp.status()
    );
    resp.json().await.expect("Failed to parse login response")
}
