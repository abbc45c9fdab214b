//! Design assistant route handlers.
//!
//! Each session is a persistent conversation with the design assistant.
//! Sessions expire after 15 days unless favorited; a user may hold at most
//! five favorites at a time.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use aurelia_core::{DesignSessionId, MessageRole};

use crate::db::{DesignRepository, SupportRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::design::{DesignMessage, DesignSession};
use crate::state::AppState;

const DEFAULT_SESSION_TITLE: &str = "Untitled design";

#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    pub title: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RenameBody {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: DesignSession,
    pub messages: Vec<DesignMessage>,
}

/// POST /assistant/sessions
#[instrument(skip(state, user, body))]
pub async fn create_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateSessionBody>,
) -> Result<(StatusCode, Json<DesignSession>)> {
    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_SESSION_TITLE);

    let session = DesignRepository::new(state.pool())
        .create(user.id, title, &body.language)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /assistant/sessions
#[instrument(skip(state, user))]
pub async fn list_sessions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<DesignSession>>> {
    let sessions = DesignRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(sessions))
}

/// GET /assistant/sessions/{id}
#[instrument(skip(state, user))]
pub async fn show_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DesignSessionId>,
) -> Result<Json<SessionDetail>> {
    let repo = DesignRepository::new(state.pool());
    let session = repo
        .get(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("design session {id}")))?;
    let messages = repo.list_messages(id).await?;

    Ok(Json(SessionDetail { session, messages }))
}

/// PATCH /assistant/sessions/{id}
#[instrument(skip(state, user, body))]
pub async fn rename_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DesignSessionId>,
    Json(body): Json<RenameBody>,
) -> Result<StatusCode> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }

    DesignRepository::new(state.pool())
        .rename(id, user.id, title)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /assistant/sessions/{id}
#[instrument(skip(state, user))]
pub async fn delete_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DesignSessionId>,
) -> Result<StatusCode> {
    DesignRepository::new(state.pool())
        .delete(id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /assistant/sessions/{id}/favorite
#[instrument(skip(state, user))]
pub async fn favorite_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DesignSessionId>,
) -> Result<Json<DesignSession>> {
    let session = DesignRepository::new(state.pool())
        .favorite(id, user.id)
        .await?;
    Ok(Json(session))
}

/// DELETE /assistant/sessions/{id}/favorite
#[instrument(skip(state, user))]
pub async fn unfavorite_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DesignSessionId>,
) -> Result<Json<DesignSession>> {
    let session = DesignRepository::new(state.pool())
        .unfavorite(id, user.id)
        .await?;
    Ok(Json(session))
}

/// POST /assistant/sessions/{id}/messages
///
/// Appends the shopper's message, relays the full log to the assistant, and
/// appends its reply. Every exchange is also written to the support log; an
/// assistant failure raises an operator alert before surfacing the error.
#[instrument(skip(state, user, body))]
pub async fn send_message(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DesignSessionId>,
    Json(body): Json<MessageBody>,
) -> Result<Json<DesignMessage>> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let repo = DesignRepository::new(state.pool());
    let session = repo
        .get(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("design session {id}")))?;

    repo.append_message(id, MessageRole::User, content).await?;
    let history = repo.list_messages(id).await?;

    let support = SupportRepository::new(state.pool());
    let reply = match state.assistant().reply(&session.language, &history).await {
        Ok(reply) => reply,
        Err(err) => {
            support
                .raise_alert("error", &format!("design assistant failure: {err}"))
                .await?;
            return Err(err.into());
        }
    };

    let message = repo
        .append_message(id, MessageRole::Assistant, &reply)
        .await?;
    support
        .log_exchange(Some(user.id), Some(id), &session.language, content, &reply)
        .await?;

    Ok(Json(message))
}
