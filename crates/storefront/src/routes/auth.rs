//! Auth route handlers.
//!
//! Login and registration both absorb the session's guest cart into the
//! account cart, then drop the session copy.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::CartRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{RequireAuth, clear_current_user, set_current_user};
use crate::models::cart::GuestCart;
use crate::models::user::User;
use crate::models::{CurrentUser, session_keys};
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

/// POST /auth/register
#[instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<CurrentUser>> {
    let auth = AuthService::new(state.pool());
    let user = auth.register(&body.email, &body.password).await?;

    establish_session(&state, &session, &user).await
}

/// POST /auth/login
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<CurrentUser>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;

    establish_session(&state, &session, &user).await
}

/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session).await?;
    session
        .remove::<crate::models::address::ShippingAddress>(session_keys::CHECKOUT_ADDRESS)
        .await?;
    clear_sentry_user();

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// GET /auth/me
#[instrument(skip(user))]
pub async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}

/// Rotate the session, merge any guest cart, and store the identity.
async fn establish_session(
    state: &AppState,
    session: &Session,
    user: &User,
) -> Result<Json<CurrentUser>> {
    // Fresh session id so a pre-login cookie can't be replayed as the user
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session cycle failed: {e}")))?;

    if let Some(guest) = session
        .get::<GuestCart>(session_keys::GUEST_CART)
        .await?
        .filter(|cart| !cart.is_empty())
    {
        CartRepository::new(state.pool())
            .merge_guest_cart(user.id, &guest)
            .await?;
        session.remove::<GuestCart>(session_keys::GUEST_CART).await?;
    }

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(current))
}
