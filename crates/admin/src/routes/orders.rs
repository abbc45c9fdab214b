//! Order management handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use aurelia_core::{OrderId, OrderStatus, PaymentStatus, Role};

use crate::db::{OrderFilter, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireBackOffice;
use crate::models::order::{Order, OrderDetail, OrderPage};
use crate::routes::require_role;
use crate::state::AppState;

const DEFAULT_PER_PAGE: u32 = 25;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Matches the order number or the snapshotted email.
    pub q: Option<String>,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl From<&ListQuery> for OrderFilter {
    fn from(query: &ListQuery) -> Self {
        Self {
            status: query.status,
            payment_status: query.payment_status,
            from: query.from,
            to: query.to,
            search: query.q.clone(),
        }
    }
}

/// GET /orders
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Query(query): Query<ListQuery>,
) -> Result<Json<OrderPage>> {
    let page = OrderRepository::new(state.pool())
        .list(&OrderFilter::from(&query), query.page, query.per_page)
        .await?;
    Ok(Json(page))
}

/// GET /orders/{id}
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let detail = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

/// PATCH /orders/{id}/status
#[instrument(skip(state, admin, body))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireBackOffice(admin): RequireBackOffice,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Order>> {
    require_role(&admin, Role::Admin)?;

    let order = OrderRepository::new(state.pool())
        .set_status(id, body.status)
        .await?;
    tracing::info!(order_id = %id, status = %body.status, admin_id = %admin.id, "Order status updated");
    Ok(Json(order))
}
