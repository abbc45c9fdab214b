//! Refund management handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use aurelia_core::{OrderId, RefundId, RefundStatus, Role};

use crate::db::{RefundFilter, RefundRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireBackOffice;
use crate::models::refund::{Refund, RefundPage};
use crate::routes::require_role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub status: Option<RefundStatus>,
    pub order_id: Option<OrderId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    25
}

impl From<&ListQuery> for RefundFilter {
    fn from(query: &ListQuery) -> Self {
        Self {
            status: query.status,
            order_id: query.order_id,
            from: query.from,
            to: query.to,
        }
    }
}

/// GET /refunds
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Query(query): Query<ListQuery>,
) -> Result<Json<RefundPage>> {
    let page = RefundRepository::new(state.pool())
        .list(&RefundFilter::from(&query), query.page, query.per_page)
        .await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub order_id: OrderId,
    pub amount: Decimal,
    pub reason: Option<String>,
}

/// POST /refunds
#[instrument(skip(state, admin, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<Refund>)> {
    require_role(&admin, Role::Admin)?;

    let refund = RefundRepository::new(state.pool())
        .create(body.order_id, body.amount, body.reason.as_deref(), admin.id)
        .await?;
    tracing::info!(
        refund_id = %refund.id,
        order_id = %body.order_id,
        admin_id = %admin.id,
        "Refund raised"
    );
    Ok((StatusCode::CREATED, Json(refund)))
}

/// GET /refunds/{id}
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Path(id): Path<RefundId>,
) -> Result<Json<Refund>> {
    let refund = RefundRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("refund {id}")))?;
    Ok(Json(refund))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: RefundStatus,
}

/// PATCH /refunds/{id}/status
#[instrument(skip(state, admin, body))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Path(id): Path<RefundId>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Refund>> {
    require_role(&admin, Role::Admin)?;

    let refund = RefundRepository::new(state.pool())
        .set_status(id, body.status)
        .await?;
    tracing::info!(refund_id = %id, status = %body.status, admin_id = %admin.id, "Refund status updated");
    Ok(Json(refund))
}
