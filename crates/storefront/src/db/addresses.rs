//! Saved address repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use aurelia_core::{AddressId, AddressKind, UserId};

use super::{RepositoryError, parse_stored};
use crate::models::address::{SavedAddress, ShippingAddress};

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    kind: String,
    is_default: bool,
    name: String,
    phone: String,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    state: String,
    country: String,
    pincode: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AddressRow> for SavedAddress {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            kind: parse_stored::<AddressKind>(&row.kind)?,
            is_default: row.is_default,
            address: ShippingAddress {
                name: row.name,
                phone: row.phone,
                address_line1: row.address_line1,
                address_line2: row.address_line2,
                city: row.city,
                state: row.state,
                country: row.country,
                pincode: row.pincode,
            },
            created_at: row.created_at,
        })
    }
}

/// Repository for a user's saved addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List saved addresses, the default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<SavedAddress>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            "SELECT id, user_id, kind, is_default, name, phone, address_line1,
                    address_line2, city, state, country, pincode, created_at
             FROM shop.addresses
             WHERE user_id = $1
             ORDER BY is_default DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Save an address. The user's first address becomes their default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save(
        &self,
        user_id: UserId,
        kind: AddressKind,
        address: &ShippingAddress,
    ) -> Result<SavedAddress, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            "INSERT INTO shop.addresses
                 (user_id, kind, is_default, name, phone, address_line1,
                  address_line2, city, state, country, pincode)
             VALUES ($1, $2,
                     NOT EXISTS (SELECT 1 FROM shop.addresses WHERE user_id = $1),
                     $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id, user_id, kind, is_default, name, phone, address_line1,
                       address_line2, city, state, country, pincode, created_at",
        )
        .bind(user_id)
        .bind(kind.to_string())
        .bind(&address.name)
        .bind(&address.phone)
        .bind(&address.address_line1)
        .bind(address.address_line2.as_deref())
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.country)
        .bind(&address.pincode)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Delete one of the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not belong to
    /// the user.
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
