//! Newsletter signup route handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use aurelia_core::Email;

use crate::db::NewsletterRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    pub email: String,
}

/// POST /newsletter
///
/// Idempotent: subscribing an already-subscribed address succeeds quietly.
#[instrument(skip(state, body))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeBody>,
) -> Result<Json<serde_json::Value>> {
    let email = Email::parse(&body.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    NewsletterRepository::new(state.pool())
        .subscribe(&email)
        .await?;

    Ok(Json(json!({ "subscribed": true })))
}
