//! Design session repository.
//!
//! Sessions expire 15 days after creation unless favorited. The favorite
//! cap is enforced inside a transaction holding the user's session rows,
//! so two concurrent favorites cannot both slip under the limit.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use aurelia_core::{DesignMessageId, DesignSessionId, MessageRole, UserId};

use super::{RepositoryError, parse_stored};
use crate::models::design::{
    DesignMessage, DesignSession, MAX_FAVORITE_SESSIONS, SESSION_TTL_DAYS, favorite_cap_reached,
};

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: i32,
    user_id: i32,
    title: String,
    language: String,
    favorite: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SessionRow> for DesignSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: DesignSessionId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            language: row.language,
            favorite: row.favorite,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i32,
    session_id: i32,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for DesignMessage {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DesignMessageId::new(row.id),
            session_id: DesignSessionId::new(row.session_id),
            role: parse_stored::<MessageRole>(&row.role)?,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

/// Repository for AI design sessions and their message logs.
pub struct DesignRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DesignRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a session with the standard expiry window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        title: &str,
        language: &str,
    ) -> Result<DesignSession, RepositoryError> {
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
        let row = sqlx::query_as::<_, SessionRow>(
            "INSERT INTO shop.design_sessions (user_id, title, language, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, title, language, favorite, expires_at,
                       created_at, updated_at",
        )
        .bind(user_id)
        .bind(title)
        .bind(language)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List the user's live sessions, favorites first then most recent.
    /// Expired sessions are filtered out rather than eagerly deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<DesignSession>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, title, language, favorite, expires_at,
                    created_at, updated_at
             FROM shop.design_sessions
             WHERE user_id = $1 AND (expires_at IS NULL OR expires_at > now())
             ORDER BY favorite DESC, updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Fetch one live session owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: DesignSessionId,
        user_id: UserId,
    ) -> Result<Option<DesignSession>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, title, language, favorite, expires_at,
                    created_at, updated_at
             FROM shop.design_sessions
             WHERE id = $1 AND user_id = $2 AND (expires_at IS NULL OR expires_at > now())",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Rename a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session is not the user's.
    pub async fn rename(
        &self,
        id: DesignSessionId,
        user_id: UserId,
        title: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.design_sessions SET title = $3, updated_at = now()
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a session and its message log.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session is not the user's.
    pub async fn delete(
        &self,
        id: DesignSessionId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM shop.design_sessions WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Favorite a session, clearing its expiry. Enforces the per-user cap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the user already holds the
    /// maximum number of favorites, `NotFound` if the session is not theirs.
    pub async fn favorite(
        &self,
        id: DesignSessionId,
        user_id: UserId,
    ) -> Result<DesignSession, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let favorites: Vec<(i32,)> = sqlx::query_as(
            "SELECT id FROM shop.design_sessions
             WHERE user_id = $1 AND favorite FOR UPDATE",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let already = favorites.iter().any(|(fid,)| *fid == id.as_i32());
        let count = i64::try_from(favorites.len()).unwrap_or(i64::MAX);
        if !already && favorite_cap_reached(count) {
            return Err(RepositoryError::Conflict(format!(
                "favorite limit of {MAX_FAVORITE_SESSIONS} reached"
            )));
        }

        let row = sqlx::query_as::<_, SessionRow>(
            "UPDATE shop.design_sessions
             SET favorite = true, expires_at = NULL, updated_at = now()
             WHERE id = $1 AND user_id = $2 AND (expires_at IS NULL OR expires_at > now())
             RETURNING id, user_id, title, language, favorite, expires_at,
                       created_at, updated_at",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Unfavorite a session, restarting its expiry window from now.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session is not the user's.
    pub async fn unfavorite(
        &self,
        id: DesignSessionId,
        user_id: UserId,
    ) -> Result<DesignSession, RepositoryError> {
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
        let row = sqlx::query_as::<_, SessionRow>(
            "UPDATE shop.design_sessions
             SET favorite = false, expires_at = $3, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING id, user_id, title, language, favorite, expires_at,
                       created_at, updated_at",
        )
        .bind(id)
        .bind(user_id)
        .bind(expires_at)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Append one message to a session's log and bump its activity time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn append_message(
        &self,
        session_id: DesignSessionId,
        role: MessageRole,
        content: &str,
    ) -> Result<DesignMessage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, MessageRow>(
            "INSERT INTO shop.design_messages (session_id, role, content)
             VALUES ($1, $2, $3)
             RETURNING id, session_id, role, content, created_at",
        )
        .bind(session_id)
        .bind(role.to_string())
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE shop.design_sessions SET updated_at = now() WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        row.try_into()
    }

    /// The session's full message log in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_messages(
        &self,
        session_id: DesignSessionId,
    ) -> Result<Vec<DesignMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, session_id, role, content, created_at
             FROM shop.design_messages WHERE session_id = $1 ORDER BY id",
        )
        .bind(session_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
