//! Catalog management handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use aurelia_core::{ProductId, ProductStatus, Role};

use crate::db::{ProductInput, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireBackOffice;
use crate::models::product::{Product, ProductDetail, ProductImage, ProductPage, ProductVideo};
use crate::routes::require_role;
use crate::services::storage::{MediaKind, validate_upload};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Name substring search.
    pub q: Option<String>,
    pub status: Option<ProductStatus>,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    25
}

/// GET /products
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductPage>> {
    let page = ProductRepository::new(state.pool())
        .list(query.q.as_deref(), query.status, query.page, query.per_page)
        .await?;
    Ok(Json(page))
}

/// GET /products/{id}
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let detail = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct ProductBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub category: Option<String>,
}

impl ProductBody {
    fn into_input(self) -> Result<ProductInput> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        Ok(ProductInput {
            name,
            description: self.description,
            price: self.price,
            category: self.category.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// POST /products
#[instrument(skip(state, admin, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<Product>)> {
    require_role(&admin, Role::Admin)?;

    let product = ProductRepository::new(state.pool())
        .create(&body.into_input()?, state.config().currency)
        .await?;
    tracing::info!(product_id = %product.id, admin_id = %admin.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/{id}
#[instrument(skip(state, admin, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductBody>,
) -> Result<Json<Product>> {
    require_role(&admin, Role::Admin)?;

    let product = ProductRepository::new(state.pool())
        .update(id, &body.into_input()?)
        .await?;
    Ok(Json(product))
}

/// DELETE /products/{id}
///
/// Archives the product; order history keeps its snapshots either way.
#[instrument(skip(state, admin))]
pub async fn archive(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    require_role(&admin, Role::Admin)?;

    let product = ProductRepository::new(state.pool()).archive(id).await?;
    tracing::info!(product_id = %id, admin_id = %admin.id, "Product archived");
    Ok(Json(product))
}

/// POST /products/{id}/restore
#[instrument(skip(state, admin))]
pub async fn restore(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    require_role(&admin, Role::Admin)?;

    let product = ProductRepository::new(state.pool()).restore(id).await?;
    Ok(Json(product))
}

/// POST /products/{id}/images
#[instrument(skip(state, admin, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductImage>)> {
    require_role(&admin, Role::Admin)?;

    let upload = read_upload(multipart, MediaKind::Image).await?;
    let stored = state
        .storage()
        .upload(
            MediaKind::Image,
            id,
            &upload.filename,
            &upload.content_type,
            upload.bytes,
        )
        .await?;
    let image = ProductRepository::new(state.pool())
        .add_image(id, &stored.storage_key, &stored.url)
        .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// POST /products/{id}/videos
#[instrument(skip(state, admin, multipart))]
pub async fn upload_video(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductVideo>)> {
    require_role(&admin, Role::Admin)?;

    let upload = read_upload(multipart, MediaKind::Video).await?;
    let stored = state
        .storage()
        .upload(
            MediaKind::Video,
            id,
            &upload.filename,
            &upload.content_type,
            upload.bytes,
        )
        .await?;
    let video = ProductRepository::new(state.pool())
        .add_video(id, &stored.storage_key, &stored.url)
        .await?;
    Ok((StatusCode::CREATED, Json(video)))
}

struct Upload {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Pull the `file` field out of a multipart body and validate it.
async fn read_upload(mut multipart: Multipart, kind: MediaKind) -> Result<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .ok_or_else(|| AppError::BadRequest("upload is missing a content type".to_string()))?
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?
            .to_vec();

        validate_upload(kind, bytes.len(), &content_type).map_err(AppError::BadRequest)?;

        return Ok(Upload {
            filename,
            content_type,
            bytes,
        });
    }

    Err(AppError::BadRequest(
        "multipart body is missing a 'file' field".to_string(),
    ))
}
