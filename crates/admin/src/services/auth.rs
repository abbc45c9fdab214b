//! Back-office authentication.
//!
//! Admins log in with the same accounts table as shoppers; the difference
//! is the role floor. A plain shopper account is rejected here outright.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use sqlx::PgPool;
use thiserror::Error;

use aurelia_core::{Email, EmailError};

use crate::db::{RepositoryError, UserRepository};
use crate::models::CurrentAdmin;

/// Authentication errors for back-office login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account has no back-office access")]
    NotBackOffice,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Authentication service over the shared users table.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Login with email and password, requiring a back-office role.
    ///
    /// The role check runs after password verification so a wrong password
    /// and a shopper account are indistinguishable only in timing, not in
    /// the response.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong and `NotBackOffice` for a valid shopper login.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentAdmin, AuthError> {
        let email = Email::parse(email)?;

        let (user_id, role, password_hash) = self
            .users
            .get_auth_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !role.is_back_office() {
            return Err(AuthError::NotBackOffice);
        }

        Ok(CurrentAdmin {
            id: user_id,
            email,
            role,
        })
    }
}

/// Verify a password against a stored Argon2id hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    fn hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_verify_password_roundtrip() {
        let stored = hash("correct horse battery");
        assert!(verify_password("correct horse battery", &stored).is_ok());
        assert!(matches!(
            verify_password("wrong password", &stored),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_rejected() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
