//! User management handlers.
//!
//! Viewing is open to all back-office roles; changing roles and deleting
//! accounts is reserved for super admins.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use aurelia_core::{Role, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireBackOffice;
use crate::models::user::{User, UserPage};
use crate::routes::require_role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Email substring search.
    pub q: Option<String>,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    25
}

/// GET /users
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Query(query): Query<ListQuery>,
) -> Result<Json<UserPage>> {
    let page = UserRepository::new(state.pool())
        .list(query.q.as_deref(), query.page, query.per_page)
        .await?;
    Ok(Json(page))
}

/// GET /users/{id}
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
    pub role: Role,
}

/// PATCH /users/{id}/role
#[instrument(skip(state, admin, body))]
pub async fn set_role(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Path(id): Path<UserId>,
    Json(body): Json<RoleBody>,
) -> Result<Json<User>> {
    require_role(&admin, Role::SuperAdmin)?;

    let user = UserRepository::new(state.pool())
        .set_role(id, body.role)
        .await?;
    tracing::info!(user_id = %id, role = %body.role, admin_id = %admin.id, "Role changed");
    Ok(Json(user))
}

/// DELETE /users/{id}
#[instrument(skip(state, admin))]
pub async fn remove(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    require_role(&admin, Role::SuperAdmin)?;

    UserRepository::new(state.pool()).delete(id).await?;
    tracing::info!(user_id = %id, admin_id = %admin.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
