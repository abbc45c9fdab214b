//! Database operations for the back-office.
//!
//! The admin talks to the same `shop` schema as the storefront but through
//! its own repositories: these read across all shoppers, apply list filters,
//! and perform writes the storefront never does (status changes, refunds,
//! role changes, catalog CRUD).
//!
//! All queries are runtime-checked (`sqlx::query_as` over explicit row
//! structs) so the workspace builds without a live database.

pub mod orders;
pub mod products;
pub mod refunds;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::{OrderFilter, OrderRepository};
pub use products::{ProductInput, ProductRepository};
pub use refunds::{RefundFilter, RefundRepository};
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., refund over the order total).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Parse a stored enum column, mapping bad values to data corruption.
pub(crate) fn parse_stored<T>(value: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| RepositoryError::DataCorruption(e))
}

/// Clamp pagination parameters to sane bounds.
///
/// Returns `(page, per_page, offset)` with `page >= 1` and
/// `per_page` in `1..=100`.
pub(crate) fn clamp_page(page: u32, per_page: u32) -> (u32, u32, i64) {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = i64::from(page - 1) * i64::from(per_page);
    (page, per_page, offset)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_defaults() {
        assert_eq!(clamp_page(0, 0), (1, 1, 0));
        assert_eq!(clamp_page(1, 25), (1, 25, 0));
        assert_eq!(clamp_page(3, 50), (3, 50, 100));
        assert_eq!(clamp_page(2, 500), (2, 100, 100));
    }
}
