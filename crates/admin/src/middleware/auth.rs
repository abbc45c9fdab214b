//! Authentication middleware and extractors.
//!
//! [`RequireBackOffice`] gates every admin route on a back-office role;
//! handlers that need more than read access check the role floor themselves
//! via [`aurelia_core::Role::allows`].

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a logged-in back-office user.
///
/// Rejects with 401 when nobody is logged in and 403 when the session
/// belongs to a plain shopper account.
pub struct RequireBackOffice(pub CurrentAdmin);

/// Rejection returned when a handler requires back-office access.
pub enum AuthRejection {
    NotLoggedIn,
    NotBackOffice,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotLoggedIn => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response(),
            Self::NotBackOffice => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Insufficient role for this operation" })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireBackOffice
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::NotLoggedIn)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::NotLoggedIn)?;

        if !admin.role.is_back_office() {
            return Err(AuthRejection::NotBackOffice);
        }

        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
