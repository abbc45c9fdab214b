//! Back-office authentication handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::RequireBackOffice;
use crate::middleware::auth::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// POST /auth/login
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginBody>,
) -> Result<Json<CurrentAdmin>> {
    let admin = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    // New session id on login, so a pre-login cookie can't be replayed
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session cycle: {e}")))?;
    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.id, Some(admin.email.as_str()));

    tracing::info!(admin_id = %admin.id, role = %admin.role, "Back-office login");
    Ok(Json(admin))
}

/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// GET /auth/me
#[instrument(skip(admin))]
pub async fn me(RequireBackOffice(admin): RequireBackOffice) -> Json<CurrentAdmin> {
    Json(admin)
}
