//! Newsletter subscriber repository.

use sqlx::PgPool;

use aurelia_core::Email;

use super::RepositoryError;

/// Repository for newsletter signups.
pub struct NewsletterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsletterRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an email address. Re-subscribing is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn subscribe(&self, email: &Email) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO shop.newsletter_subscribers (email) VALUES ($1)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
