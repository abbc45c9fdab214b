//! HTTP route handlers for the admin API.
//!
//! Every route below `/auth` requires a back-office session (moderator or
//! higher); writes additionally check a role floor in the handler.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Health check
//! GET    /ready                        - Readiness check (database ping)
//!
//! # Auth
//! POST   /auth/login                   - Back-office login
//! POST   /auth/logout                  - Logout
//! GET    /auth/me                      - Current admin
//!
//! # Orders (moderator+; status update admin+)
//! GET    /orders                       - Listing (status, payment_status, from, to, q)
//! GET    /orders/{id}                  - Detail with items and refunds
//! PATCH  /orders/{id}/status           - Set lifecycle status
//!
//! # Refunds (moderator+ reads; writes admin+)
//! GET    /refunds                      - Listing (status, order_id, from, to)
//! POST   /refunds                      - Raise a refund
//! GET    /refunds/{id}                 - Detail
//! PATCH  /refunds/{id}/status          - Set status (completed marks the order refunded)
//!
//! # Users (moderator+ reads; role change and delete super admin only)
//! GET    /users                        - Listing (q searches email)
//! GET    /users/{id}                   - Detail
//! PATCH  /users/{id}/role              - Change role
//! DELETE /users/{id}                   - Delete account
//!
//! # Products (moderator+ reads; writes admin+)
//! GET    /products                     - Listing (q, status)
//! POST   /products                     - Create
//! GET    /products/{id}                - Detail with media
//! PUT    /products/{id}                - Update
//! DELETE /products/{id}                - Archive
//! POST   /products/{id}/restore        - Restore an archived product
//! POST   /products/{id}/images         - Upload an image (multipart, <= 10 MB)
//! POST   /products/{id}/videos         - Upload a video (multipart, <= 100 MB)
//!
//! # Exports (moderator+)
//! GET    /exports/orders.csv
//! GET    /exports/refunds.csv
//! GET    /exports/users.csv
//! ```

pub mod auth;
pub mod exports;
pub mod orders;
pub mod products;
pub mod refunds;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};

use aurelia_core::Role;

use crate::error::{AppError, Result};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Check a role floor for a write operation.
fn require_role(admin: &CurrentAdmin, floor: Role) -> Result<()> {
    if admin.role.allows(floor) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "requires the {floor} role or higher"
        )))
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", patch(orders::set_status))
}

/// Create the refund routes router.
pub fn refund_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(refunds::index).post(refunds::create))
        .route("/{id}", get(refunds::show))
        .route("/{id}/status", patch(refunds::set_status))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}", get(users::show).delete(users::remove))
        .route("/{id}/role", patch(users::set_role))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::archive),
        )
        .route("/{id}/restore", post(products::restore))
        .route("/{id}/images", post(products::upload_image))
        .route("/{id}/videos", post(products::upload_video))
}

/// Create the export routes router.
pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/orders.csv", get(exports::orders_csv))
        .route("/refunds.csv", get(exports::refunds_csv))
        .route("/users.csv", get(exports::users_csv))
}
