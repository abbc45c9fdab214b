//! Video assistant session repository.
//!
//! Lifecycle: `requested` moves to `active` (with a joinable room URL) or
//! `failed` (with a reason); either may later be `closed`. A failed request
//! is retried by creating a fresh session, never by mutating the old row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use aurelia_core::{UserId, VideoSessionId, VideoSessionState};

use super::{RepositoryError, parse_stored};
use crate::models::design::VideoSession;

#[derive(Debug, sqlx::FromRow)]
struct VideoRow {
    id: i32,
    user_id: Option<i32>,
    language: String,
    state: String,
    conversation_url: Option<String>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VideoRow> for VideoSession {
    type Error = RepositoryError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VideoSessionId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            language: row.language,
            state: parse_stored::<VideoSessionState>(&row.state)?,
            conversation_url: row.conversation_url,
            failure_reason: row.failure_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const VIDEO_COLUMNS: &str = "id, user_id, language, state, conversation_url, failure_reason,
     created_at, updated_at";

/// Repository for video assistant sessions.
pub struct VideoSessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VideoSessionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a new session in the `requested` state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: Option<UserId>,
        language: &str,
    ) -> Result<VideoSession, RepositoryError> {
        let sql = format!(
            "INSERT INTO shop.video_sessions (user_id, language)
             VALUES ($1, $2) RETURNING {VIDEO_COLUMNS}"
        );
        let row = sqlx::query_as::<_, VideoRow>(&sql)
            .bind(user_id)
            .bind(language)
            .fetch_one(self.pool)
            .await?;

        row.try_into()
    }

    /// Move a requested session to `active` with its room URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session is not in the
    /// `requested` state.
    pub async fn mark_active(
        &self,
        id: VideoSessionId,
        conversation_url: &str,
    ) -> Result<VideoSession, RepositoryError> {
        let sql = format!(
            "UPDATE shop.video_sessions
             SET state = 'active', conversation_url = $2, updated_at = now()
             WHERE id = $1 AND state = 'requested'
             RETURNING {VIDEO_COLUMNS}"
        );
        let row = sqlx::query_as::<_, VideoRow>(&sql)
            .bind(id)
            .bind(conversation_url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Move a requested session to `failed` with the provider's reason.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session is not in the
    /// `requested` state.
    pub async fn mark_failed(
        &self,
        id: VideoSessionId,
        reason: &str,
    ) -> Result<VideoSession, RepositoryError> {
        let sql = format!(
            "UPDATE shop.video_sessions
             SET state = 'failed', failure_reason = $2, updated_at = now()
             WHERE id = $1 AND state = 'requested'
             RETURNING {VIDEO_COLUMNS}"
        );
        let row = sqlx::query_as::<_, VideoRow>(&sql)
            .bind(id)
            .bind(reason)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Close an active or failed session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session does not exist or
    /// is still `requested`.
    pub async fn close(&self, id: VideoSessionId) -> Result<VideoSession, RepositoryError> {
        let sql = format!(
            "UPDATE shop.video_sessions
             SET state = 'closed', updated_at = now()
             WHERE id = $1 AND state IN ('active', 'failed')
             RETURNING {VIDEO_COLUMNS}"
        );
        let row = sqlx::query_as::<_, VideoRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Fetch a session by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: VideoSessionId) -> Result<Option<VideoSession>, RepositoryError> {
        let sql = format!("SELECT {VIDEO_COLUMNS} FROM shop.video_sessions WHERE id = $1");
        let row = sqlx::query_as::<_, VideoRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }
}
