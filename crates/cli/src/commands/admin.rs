//! Back-office user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new back-office user
//! aurelia-cli admin create -e admin@example.com -p 's3cure-pass' -r super_admin
//!
//! # Change an existing user's role
//! aurelia-cli admin promote -e staff@example.com -r moderator
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use aurelia_core::{Email, Role};

use super::{CommandError, connect};

/// Create a new back-office user with a password.
///
/// # Errors
///
/// Returns `CommandError` if the role or email is invalid, the email is
/// already registered, or the database fails.
pub async fn create_user(email: &str, password: &str, role: &str) -> Result<i32, CommandError> {
    let role: Role = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| CommandError::InvalidEmail(e.to_string()))?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| CommandError::PasswordHash)?
        .to_string();

    let pool = connect().await?;

    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM shop.users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&pool)
            .await?;
    if existing.is_some() {
        return Err(CommandError::UserExists(email.as_str().to_owned()));
    }

    let (user_id,): (i32,) = sqlx::query_as(
        "INSERT INTO shop.users (email, password_hash, role)
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(email.as_str())
    .bind(&password_hash)
    .bind(role.to_string())
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user_id,
        email,
        role
    );

    Ok(user_id)
}

/// Change an existing user's role.
///
/// # Errors
///
/// Returns `CommandError` if the role or email is invalid, no account
/// matches, or the database fails.
pub async fn promote_user(email: &str, role: &str) -> Result<(), CommandError> {
    let role: Role = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| CommandError::InvalidEmail(e.to_string()))?;

    let pool = connect().await?;

    let result = sqlx::query("UPDATE shop.users SET role = $2, updated_at = now() WHERE email = $1")
        .bind(email.as_str())
        .bind(role.to_string())
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CommandError::UserNotFound(email.as_str().to_owned()));
    }

    tracing::info!("Role updated: {} is now {}", email, role);
    Ok(())
}
