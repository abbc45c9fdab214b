//! Integration tests for AI design sessions.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p aurelia-storefront)

use reqwest::StatusCode;
use serde_json::{Value, json};

use integration_tests::{client, register_shopper, storefront_base_url};

async fn create_session(client: &reqwest::Client, title: &str) -> i64 {
    let body: Value = client
        .post(format!("{}/assistant/sessions", storefront_base_url()))
        .json(&json!({ "title": title }))
        .send()
        .await
        .expect("Failed to create session")
        .json()
        .await
        .expect("Failed to parse session");
    body["id"].as_i64().expect("session id")
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_session_lifecycle() {
    let client = client();
    let base_url = storefront_base_url();
    register_shopper(&client).await;

    let id = create_session(&client, "Emerald pendant ideas").await;

    // New sessions carry an expiry; favorites clear it
    let session: Value = client
        .get(format!("{base_url}/assistant/sessions/{id}"))
        .send()
        .await
        .expect("Failed to read session")
        .json()
        .await
        .expect("Failed to parse session");
    assert!(!session["expires_at"].is_null());

    let resp = client
        .post(format!("{base_url}/assistant/sessions/{id}/favorite"))
        .send()
        .await
        .expect("Failed to favorite");
    assert_eq!(resp.status(), StatusCode::OK);

    let session: Value = client
        .get(format!("{base_url}/assistant/sessions/{id}"))
        .send()
        .await
        .expect("Failed to read session")
        .json()
        .await
        .expect("Failed to parse session");
    assert_eq!(session["favorite"], true);
    assert!(session["expires_at"].is_null());

    // Unfavoriting restores the expiry clock
    let resp = client
        .delete(format!("{base_url}/assistant/sessions/{id}/favorite"))
        .send()
        .await
        .expect("Failed to unfavorite");
    assert_eq!(resp.status(), StatusCode::OK);

    let session: Value = client
        .get(format!("{base_url}/assistant/sessions/{id}"))
        .send()
        .await
        .expect("Failed to read session")
        .json()
        .await
        .expect("Failed to parse session");
    assert!(!session["expires_at"].is_null());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_favorite_cap_is_five() {
    let client = client();
    let base_url = storefront_base_url();
    register_shopper(&client).await;

    // Five favorites fit
    for n in 0..5 {
        let id = create_session(&client, &format!("Design {n}")).await;
        let resp = client
            .post(format!("{base_url}/assistant/sessions/{id}/favorite"))
            .send()
            .await
            .expect("Failed to favorite");
        assert_eq!(resp.status(), StatusCode::OK, "favorite {n}");
    }

    // The sixth is refused
    let id = create_session(&client, "One too many").await;
    let resp = client
        .post(format!("{base_url}/assistant/sessions/{id}/favorite"))
        .send()
        .await
        .expect("Failed to favorite");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_sessions_require_login() {
    let client = client();
    let resp = client
        .get(format!("{}/assistant/sessions", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list sessions");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
