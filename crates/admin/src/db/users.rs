//! User repository: account listing, role management, deletion.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use aurelia_core::{Email, Role, UserId};

use super::{RepositoryError, clamp_page, parse_stored};
use crate::models::user::{User, UserPage};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: UserId::new(row.id),
            email,
            role: parse_stored::<Role>(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user accounts as the back-office manages them.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List users newest first, optionally filtered by an email substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<UserPage, RepositoryError> {
        let (page, per_page, offset) = clamp_page(page, per_page);
        let pattern = search.map(|s| format!("%{}%", s.replace(['%', '_'], "")));

        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, role, created_at, updated_at FROM shop.users
             WHERE ($1::text IS NULL OR email ILIKE $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(pattern.as_deref())
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shop.users WHERE ($1::text IS NULL OR email ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserPage {
            users,
            total,
            page,
            per_page,
        })
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if a stored value is invalid.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, role, created_at, updated_at FROM shop.users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Change a user's role.
    ///
    /// Demoting the last remaining super admin is refused so the back-office
    /// can never lock itself out of role management.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist and
    /// `Conflict` when the change would remove the last super admin.
    pub async fn set_role(&self, id: UserId, role: Role) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT role FROM shop.users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (current,) = current.ok_or(RepositoryError::NotFound)?;
        let current = parse_stored::<Role>(&current)?;

        if current == Role::SuperAdmin && role != Role::SuperAdmin {
            let (super_admins,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM shop.users WHERE role = 'super_admin'")
                    .fetch_one(&mut *tx)
                    .await?;
            if super_admins <= 1 {
                return Err(RepositoryError::Conflict(
                    "cannot demote the last super admin".to_string(),
                ));
            }
        }

        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE shop.users SET role = $2, updated_at = now() WHERE id = $1
             RETURNING id, email, role, created_at, updated_at",
        )
        .bind(id)
        .bind(role.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.try_into()
    }

    /// Delete a user account.
    ///
    /// Cart, wishlist, addresses, and design sessions go with it via
    /// `ON DELETE CASCADE`; orders keep their snapshotted email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist and
    /// `Conflict` when the target is the last super admin.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT role FROM shop.users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (current,) = current.ok_or(RepositoryError::NotFound)?;

        if parse_stored::<Role>(&current)? == Role::SuperAdmin {
            let (super_admins,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM shop.users WHERE role = 'super_admin'")
                    .fetch_one(&mut *tx)
                    .await?;
            if super_admins <= 1 {
                return Err(RepositoryError::Conflict(
                    "cannot delete the last super admin".to_string(),
                ));
            }
        }

        sqlx::query("DELETE FROM shop.users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Fetch the stored password hash and role for a login attempt.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_auth_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(UserId, Role, String)>, RepositoryError> {
        let row: Option<(i32, String, String)> =
            sqlx::query_as("SELECT id, role, password_hash FROM shop.users WHERE email = $1")
                .bind(email.as_str())
                .fetch_optional(self.pool)
                .await?;

        row.map(|(id, role, hash)| {
            Ok((UserId::new(id), parse_stored::<Role>(&role)?, hash))
        })
        .transpose()
    }

    /// All users, for CSV export. Newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, role, created_at, updated_at FROM shop.users
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
