//! Catalog product model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::{Price, ProductId, ProductStatus};

/// A catalog product as the storefront serves it.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: Option<String>,
    pub status: ProductStatus,
    /// Primary image URL, if any media has been uploaded.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of the catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}
