//! Catalog route handlers.
//!
//! Reads go through the in-process moka cache; writes happen in the admin
//! service, so a short TTL is the staleness bound.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use aurelia_core::ProductId;

use crate::db::{CatalogFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::product::{Product, ProductPage};
use crate::state::{AppState, CatalogCacheKey, CatalogCacheValue};

const DEFAULT_PER_PAGE: u32 = 24;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text search over name and description.
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProductPage>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, 100);
    let key = CatalogCacheKey::List(params.category.clone(), params.q.clone(), page, per_page);

    if let Some(CatalogCacheValue::Page(cached)) = state.catalog_cache().get(&key).await {
        return Ok(Json(cached));
    }

    let filter = CatalogFilter {
        category: params.category,
        search: params.q,
    };
    let result = ProductRepository::new(state.pool())
        .list(&filter, page, per_page)
        .await?;

    state
        .catalog_cache()
        .insert(key, CatalogCacheValue::Page(result.clone()))
        .await;

    Ok(Json(result))
}

/// GET /products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let key = CatalogCacheKey::Product(id.as_i32());
    if let Some(CatalogCacheValue::Product(cached)) = state.catalog_cache().get(&key).await {
        return Ok(Json(cached));
    }

    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    state
        .catalog_cache()
        .insert(key, CatalogCacheValue::Product(product.clone()))
        .await;

    Ok(Json(product))
}

/// GET /products/categories
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let key = CatalogCacheKey::Categories;
    if let Some(CatalogCacheValue::Categories(cached)) = state.catalog_cache().get(&key).await {
        return Ok(Json(cached));
    }

    let categories = ProductRepository::new(state.pool()).categories().await?;

    state
        .catalog_cache()
        .insert(key, CatalogCacheValue::Categories(categories.clone()))
        .await;

    Ok(Json(categories))
}
