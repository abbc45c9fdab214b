//! Catalog models for the back-office.
//!
//! Unlike the storefront view, these include archived products and the full
//! media lists.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::{Price, ProductId, ProductStatus};

/// A catalog product, any status.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: Option<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An uploaded product image.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    pub id: i32,
    pub url: String,
    pub position: i32,
}

/// An uploaded product video.
#[derive(Debug, Clone, Serialize)]
pub struct ProductVideo {
    pub id: i32,
    pub url: String,
    pub position: i32,
}

/// A product with its media, as returned by detail endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
    pub videos: Vec<ProductVideo>,
}

/// One page of the product listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}
