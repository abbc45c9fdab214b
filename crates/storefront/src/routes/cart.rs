//! Cart route handlers.
//!
//! Every endpoint works in both scopes: logged-in shoppers hit the
//! database cart, guests hit the session-held cart. `POST /cart/sync`
//! merges the latter into the former after login.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use aurelia_core::{CartItemId, CurrencyCode, ProductId, UserId};

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{OptionalAuth, RequireAuth};
use crate::models::cart::{CartLine, CartView, GuestCart};
use crate::models::session_keys;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemBody {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityBody {
    pub quantity: i64,
}

/// GET /cart
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<CartView>> {
    let currency = state.config().currency;
    let lines = match user {
        Some(user) => CartRepository::new(state.pool()).list(user.id).await?,
        None => {
            let guest = load_guest_cart(&session).await?;
            guest_lines(&state, &guest).await?
        }
    };
    Ok(Json(build_view(lines, currency)?))
}

/// POST /cart/items
#[instrument(skip(state, session, user))]
pub async fn add_item(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(body): Json<AddItemBody>,
) -> Result<Json<CartView>> {
    match user {
        Some(user) => {
            CartRepository::new(state.pool())
                .add(user.id, body.product_id, body.quantity)
                .await?;
            account_view(&state, user.id).await
        }
        None => {
            // Guests get the same product-exists check as account carts
            ProductRepository::new(state.pool())
                .get(body.product_id)
                .await?
                .ok_or_else(|| AppError::NotFound("product".to_string()))?;

            let mut guest = load_guest_cart(&session).await?;
            guest.add(body.product_id, body.quantity);
            store_guest_cart(&session, &guest).await?;
            guest_view(&state, &guest).await
        }
    }
}

/// PATCH /cart/items/{product_id}
#[instrument(skip(state, session, user))]
pub async fn set_quantity(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(product_id): Path<ProductId>,
    Json(body): Json<SetQuantityBody>,
) -> Result<Json<CartView>> {
    match user {
        Some(user) => {
            CartRepository::new(state.pool())
                .set_quantity(user.id, product_id, body.quantity)
                .await?;
            account_view(&state, user.id).await
        }
        None => {
            let mut guest = load_guest_cart(&session).await?;
            guest.set_quantity(product_id, body.quantity);
            store_guest_cart(&session, &guest).await?;
            guest_view(&state, &guest).await
        }
    }
}

/// DELETE /cart/items/{product_id}
#[instrument(skip(state, session, user))]
pub async fn remove_item(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>> {
    match user {
        Some(user) => {
            CartRepository::new(state.pool())
                .remove(user.id, product_id)
                .await?;
            account_view(&state, user.id).await
        }
        None => {
            let mut guest = load_guest_cart(&session).await?;
            guest.remove(product_id);
            store_guest_cart(&session, &guest).await?;
            guest_view(&state, &guest).await
        }
    }
}

/// DELETE /cart
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<CartView>> {
    if let Some(user) = user {
        CartRepository::new(state.pool()).clear(user.id).await?;
    } else {
        session.remove::<GuestCart>(session_keys::GUEST_CART).await?;
    }
    Ok(Json(build_view(Vec::new(), state.config().currency)?))
}

/// POST /cart/sync
///
/// Merges any guest cart still held by the session into the account cart.
/// Safe to call repeatedly; once merged the session copy is gone, so a
/// replay is a no-op.
#[instrument(skip(state, session, user))]
pub async fn sync(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Json<CartView>> {
    if let Some(guest) = session
        .get::<GuestCart>(session_keys::GUEST_CART)
        .await?
        .filter(|cart| !cart.is_empty())
    {
        CartRepository::new(state.pool())
            .merge_guest_cart(user.id, &guest)
            .await?;
    }
    session.remove::<GuestCart>(session_keys::GUEST_CART).await?;

    account_view(&state, user.id).await
}

async fn account_view(state: &AppState, user_id: UserId) -> Result<Json<CartView>> {
    let lines = CartRepository::new(state.pool()).list(user_id).await?;
    Ok(Json(build_view(lines, state.config().currency)?))
}

async fn guest_view(state: &AppState, guest: &GuestCart) -> Result<Json<CartView>> {
    let lines = guest_lines(state, guest).await?;
    Ok(Json(build_view(lines, state.config().currency)?))
}

fn build_view(lines: Vec<CartLine>, currency: CurrencyCode) -> Result<CartView> {
    CartView::from_lines(lines, currency)
        .ok_or_else(|| AppError::Internal("cart subtotal overflow".to_string()))
}

async fn load_guest_cart(session: &Session) -> Result<GuestCart> {
    Ok(session
        .get::<GuestCart>(session_keys::GUEST_CART)
        .await?
        .unwrap_or_default())
}

async fn store_guest_cart(session: &Session, cart: &GuestCart) -> Result<()> {
    session.insert(session_keys::GUEST_CART, cart).await?;
    Ok(())
}

/// Price the guest cart by joining its lines with current product data.
/// Lines whose product has been archived since are silently dropped.
async fn guest_lines(state: &AppState, guest: &GuestCart) -> Result<Vec<CartLine>> {
    if guest.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<ProductId> = guest.lines().iter().map(|l| l.product_id).collect();
    let products = ProductRepository::new(state.pool()).get_many(&ids).await?;

    let mut lines = Vec::new();
    for line in guest.lines() {
        let Some(product) = products.iter().find(|p| p.id == line.product_id) else {
            continue;
        };
        let line_total = product
            .price
            .checked_mul(line.quantity)
            .ok_or_else(|| AppError::Internal("cart line total overflow".to_string()))?;
        lines.push(CartLine {
            // Session lines have no database row; the product id stands in
            id: CartItemId::new(product.id.as_i32()),
            product_id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            unit_price: product.price,
            quantity: line.quantity,
            line_total,
        });
    }
    Ok(lines)
}
