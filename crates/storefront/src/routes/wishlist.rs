//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use aurelia_core::ProductId;

use crate::db::WishlistRepository;
use crate::error::Result;
use crate::middleware::auth::RequireAuth;
use crate::models::wishlist::WishlistItem;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddBody {
    pub product_id: ProductId,
}

/// GET /account/wishlist
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<WishlistItem>>> {
    let items = WishlistRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(items))
}

/// POST /account/wishlist
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddBody>,
) -> Result<Json<Vec<WishlistItem>>> {
    let repo = WishlistRepository::new(state.pool());
    repo.add(user.id, body.product_id).await?;
    Ok(Json(repo.list(user.id).await?))
}

/// DELETE /account/wishlist/{product_id}
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
