//! Support logging: assistant Q&A transcripts and operator alerts.

use sqlx::PgPool;

use aurelia_core::{DesignSessionId, UserId};

use super::RepositoryError;

/// Repository for support chat logs and alerts raised on assistant failures.
pub struct SupportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SupportRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record one assistant exchange for later review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn log_exchange(
        &self,
        user_id: Option<UserId>,
        session_id: Option<DesignSessionId>,
        language: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO shop.support_chat_logs (user_id, session_id, language, question, answer)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(session_id)
        .bind(language)
        .bind(question)
        .bind(answer)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Raise an alert for operators when an upstream provider misbehaves.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn raise_alert(&self, severity: &str, message: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO shop.support_alerts (severity, message) VALUES ($1, $2)")
            .bind(severity)
            .bind(message)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
