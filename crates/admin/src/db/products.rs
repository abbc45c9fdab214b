//! Product repository: catalog CRUD and media rows.
//!
//! Deleting a product archives it; order items snapshot product data so
//! nothing here rewrites order history either way.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use aurelia_core::{CurrencyCode, Price, ProductId, ProductStatus};

use super::{RepositoryError, clamp_page, parse_stored};
use crate::models::product::{Product, ProductDetail, ProductImage, ProductPage, ProductVideo};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, currency, category, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    currency: String,
    category: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let currency = parse_stored::<CurrencyCode>(&row.currency)?;
        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Price::new(row.price, currency),
            category: row.category,
            status: parse_stored::<ProductStatus>(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MediaRow {
    id: i32,
    url: String,
    position: i32,
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Option<String>,
}

/// Repository for catalog products as the back-office manages them.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products of any status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<ProductStatus>,
        page: u32,
        per_page: u32,
    ) -> Result<ProductPage, RepositoryError> {
        let (page, per_page, offset) = clamp_page(page, per_page);
        let pattern = search.map(|s| format!("%{}%", s.replace(['%', '_'], "")));
        let status = status.map(|s| s.to_string());

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products
             WHERE ($1::text IS NULL OR name ILIKE $1)
               AND ($2::text IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(pattern.as_deref())
            .bind(status.as_deref())
            .bind(i64::from(per_page))
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shop.products
             WHERE ($1::text IS NULL OR name ILIKE $1)
               AND ($2::text IS NULL OR status = $2)",
        )
        .bind(pattern.as_deref())
        .bind(status.as_deref())
        .fetch_one(self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductPage {
            products,
            total,
            page,
            per_page,
        })
    }

    /// Fetch one product with its media, any status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        let product: Product = row.try_into()?;

        let images = sqlx::query_as::<_, MediaRow>(
            "SELECT id, url, position FROM shop.product_images
             WHERE product_id = $1 ORDER BY position, id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        let videos = sqlx::query_as::<_, MediaRow>(
            "SELECT id, url, position FROM shop.product_videos
             WHERE product_id = $1 ORDER BY position, id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(ProductDetail {
            product,
            images: images
                .into_iter()
                .map(|m| ProductImage {
                    id: m.id,
                    url: m.url,
                    position: m.position,
                })
                .collect(),
            videos: videos
                .into_iter()
                .map(|m| ProductVideo {
                    id: m.id,
                    url: m.url,
                    position: m.position,
                })
                .collect(),
        }))
    }

    /// Create a product. New products are active immediately.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the price is not positive.
    pub async fn create(
        &self,
        input: &ProductInput,
        currency: CurrencyCode,
    ) -> Result<Product, RepositoryError> {
        if input.price <= Decimal::ZERO {
            return Err(RepositoryError::Conflict(
                "price must be positive".to_string(),
            ));
        }

        let sql = format!(
            "INSERT INTO shop.products (name, description, price, currency, category)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(currency.code())
            .bind(input.category.as_deref())
            .fetch_one(self.pool)
            .await?;

        row.try_into()
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist and
    /// `Conflict` if the price is not positive.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        if input.price <= Decimal::ZERO {
            return Err(RepositoryError::Conflict(
                "price must be positive".to_string(),
            ));
        }

        let sql = format!(
            "UPDATE shop.products
             SET name = $2, description = $3, price = $4, category = $5, updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.category.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Archive a product, hiding it from the storefront.
    ///
    /// The row stays; carts referencing it drop the line on next read and
    /// order history is untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn archive(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.set_status(id, ProductStatus::Archived).await
    }

    /// Bring an archived product back to the storefront.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn restore(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.set_status(id, ProductStatus::Active).await
    }

    async fn set_status(
        &self,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE shop.products SET status = $2, updated_at = now()
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(status.to_string())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Attach an uploaded image to a product, appending at the end.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        storage_key: &str,
        url: &str,
    ) -> Result<ProductImage, RepositoryError> {
        let row = self
            .add_media("product_images", product_id, storage_key, url)
            .await?;
        Ok(ProductImage {
            id: row.id,
            url: row.url,
            position: row.position,
        })
    }

    /// Attach an uploaded video to a product, appending at the end.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn add_video(
        &self,
        product_id: ProductId,
        storage_key: &str,
        url: &str,
    ) -> Result<ProductVideo, RepositoryError> {
        let row = self
            .add_media("product_videos", product_id, storage_key, url)
            .await?;
        Ok(ProductVideo {
            id: row.id,
            url: row.url,
            position: row.position,
        })
    }

    async fn add_media(
        &self,
        table: &str,
        product_id: ProductId,
        storage_key: &str,
        url: &str,
    ) -> Result<MediaRow, RepositoryError> {
        // INSERT .. SELECT so a missing product inserts nothing instead of
        // violating the foreign key.
        let sql = format!(
            "INSERT INTO shop.{table} (product_id, storage_key, url, position)
             SELECT p.id, $2, $3,
                    (SELECT COALESCE(MAX(m.position) + 1, 0)
                     FROM shop.{table} m WHERE m.product_id = p.id)
             FROM shop.products p WHERE p.id = $1
             RETURNING id, url, position"
        );
        sqlx::query_as::<_, MediaRow>(&sql)
            .bind(product_id)
            .bind(storage_key)
            .bind(url)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
