//! Saved address route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use aurelia_core::{AddressId, AddressKind};

use crate::db::AddressRepository;
use crate::error::Result;
use crate::middleware::auth::RequireAuth;
use crate::models::address::{SavedAddress, ShippingAddress};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveBody {
    #[serde(flatten)]
    pub address: ShippingAddress,
    #[serde(default)]
    pub kind: AddressKind,
}

/// GET /account/addresses
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<SavedAddress>>> {
    let addresses = AddressRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(addresses))
}

/// POST /account/addresses
#[instrument(skip(state, user, body))]
pub async fn save(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<SaveBody>,
) -> Result<(StatusCode, Json<SavedAddress>)> {
    body.address.validate()?;

    let saved = AddressRepository::new(state.pool())
        .save(user.id, body.kind, &body.address)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// DELETE /account/addresses/{id}
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
