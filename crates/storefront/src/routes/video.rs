//! Video assistant route handlers.
//!
//! Create records the request first, then asks the provider for a room; the
//! row ends up `active` or `failed` either way, so the client can poll the
//! same resource regardless of outcome.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use aurelia_core::{VideoSessionId, VideoSessionState};

use crate::db::{SupportRepository, VideoSessionRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::OptionalAuth;
use crate::models::design::VideoSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// POST /assistant/video-sessions
#[instrument(skip(state, user, body))]
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<VideoSession>)> {
    let session = start_session(&state, user.map(|u| u.id), &body.language).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /assistant/video-sessions/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<VideoSessionId>,
) -> Result<Json<VideoSession>> {
    let session = VideoSessionRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video session {id}")))?;
    Ok(Json(session))
}

/// POST /assistant/video-sessions/{id}/retry
///
/// A failed request is retried as a brand-new session with the same
/// language; the failed row stays as history.
#[instrument(skip(state, user))]
pub async fn retry(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<VideoSessionId>,
) -> Result<(StatusCode, Json<VideoSession>)> {
    let repo = VideoSessionRepository::new(state.pool());
    let failed = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video session {id}")))?;
    if failed.state != VideoSessionState::Failed {
        return Err(AppError::Conflict(
            "only failed sessions can be retried".to_string(),
        ));
    }

    let session = start_session(&state, user.map(|u| u.id), &failed.language).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /assistant/video-sessions/{id}/close
#[instrument(skip(state))]
pub async fn close(
    State(state): State<AppState>,
    Path(id): Path<VideoSessionId>,
) -> Result<Json<VideoSession>> {
    let session = VideoSessionRepository::new(state.pool()).close(id).await?;
    Ok(Json(session))
}

/// Record a requested session, then resolve it against the provider.
async fn start_session(
    state: &AppState,
    user_id: Option<aurelia_core::UserId>,
    language: &str,
) -> Result<VideoSession> {
    let Some(video) = state.video() else {
        return Err(AppError::Unavailable(
            "video assistant is not configured".to_string(),
        ));
    };

    let repo = VideoSessionRepository::new(state.pool());
    let session = repo.create(user_id, language).await?;

    match video.create_conversation(language).await {
        Ok(conversation) => {
            let session = repo
                .mark_active(session.id, &conversation.conversation_url)
                .await?;
            Ok(session)
        }
        Err(err) => {
            let reason = err.to_string();
            let session = repo.mark_failed(session.id, &reason).await?;
            SupportRepository::new(state.pool())
                .raise_alert("error", &format!("video session failure: {reason}"))
                .await?;
            Ok(session)
        }
    }
}
