//! Catalog repository: paginated listing with filters, and detail lookup.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use aurelia_core::{CurrencyCode, Price, ProductId, ProductStatus};

use super::{RepositoryError, parse_stored};
use crate::models::product::{Product, ProductPage};

const PRIMARY_IMAGE_SUBQUERY: &str = "(SELECT pi.url FROM shop.product_images pi
     WHERE pi.product_id = p.id ORDER BY pi.position, pi.id LIMIT 1)";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    currency: String,
    category: Option<String>,
    status: String,
    image: Option<String>,
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
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filters accepted by the catalog listing.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Repository for the public catalog.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &CatalogFilter,
        page: u32,
        per_page: u32,
    ) -> Result<ProductPage, RepositoryError> {
        let per_page = per_page.clamp(1, 100);
        let page = page.max(1);
        let offset = i64::from(page - 1) * i64::from(per_page);
        let search = filter
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.replace(['%', '_'], "")));

        let sql = format!(
            "SELECT p.id, p.name, p.description, p.price, p.currency, p.category,
                    p.status, {PRIMARY_IMAGE_SUBQUERY} AS image,
                    p.created_at, p.updated_at
             FROM shop.products p
             WHERE p.status = 'active'
               AND ($1::text IS NULL OR p.category = $1)
               AND ($2::text IS NULL OR p.name ILIKE $2 OR p.description ILIKE $2)
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(filter.category.as_deref())
            .bind(search.as_deref())
            .bind(i64::from(per_page))
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shop.products p
             WHERE p.status = 'active'
               AND ($1::text IS NULL OR p.category = $1)
               AND ($2::text IS NULL OR p.name ILIKE $2 OR p.description ILIKE $2)",
        )
        .bind(filter.category.as_deref())
        .bind(search.as_deref())
        .fetch_one(self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(ProductPage {
            products,
            total,
            page,
            per_page,
        })
    }

    /// Fetch one active product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT p.id, p.name, p.description, p.price, p.currency, p.category,
                    p.status, {PRIMARY_IMAGE_SUBQUERY} AS image,
                    p.created_at, p.updated_at
             FROM shop.products p
             WHERE p.id = $1 AND p.status = 'active'"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Fetch several active products at once, for pricing guest cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let sql = format!(
            "SELECT p.id, p.name, p.description, p.price, p.currency, p.category,
                    p.status, {PRIMARY_IMAGE_SUBQUERY} AS image,
                    p.created_at, p.updated_at
             FROM shop.products p
             WHERE p.id = ANY($1) AND p.status = 'active'
             ORDER BY p.id"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Distinct categories across active products, for the catalog filter UI.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT category FROM shop.products
             WHERE status = 'active' AND category IS NOT NULL
             ORDER BY category",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }
}
