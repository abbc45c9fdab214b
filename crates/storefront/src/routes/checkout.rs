//! Checkout wizard route handlers.
//!
//! Two steps: the address step validates and parks the shipping address in
//! the session; the payment step creates a local order plus a gateway order
//! and, once the hosted checkout completes, verifies the callback signature
//! before anything is marked paid.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use validator::Validate;

use aurelia_core::{AddressKind, OrderId, Price};

use crate::db::{AddressRepository, CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::address::ShippingAddress;
use crate::models::cart::CartView;
use crate::models::order::Order;
use crate::models::session_keys;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressBody {
    #[serde(flatten)]
    pub address: ShippingAddress,
    /// Also store it on the account for next time.
    #[serde(default)]
    pub save: bool,
    #[serde(default)]
    pub kind: AddressKind,
}

#[derive(Debug, Serialize)]
pub struct CheckoutState {
    pub address: Option<ShippingAddress>,
    pub cart: CartView,
    pub shipping: Price,
    pub total: Price,
}

#[derive(Debug, Serialize)]
pub struct PaymentOrderResponse {
    pub order_id: OrderId,
    pub order_number: String,
    pub gateway_order_id: String,
    /// Amount in minor units, as the hosted checkout page expects.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// POST /checkout/address
#[instrument(skip(state, session, user, body))]
pub async fn set_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(body): Json<AddressBody>,
) -> Result<Json<ShippingAddress>> {
    body.address.validate()?;

    if body.save {
        AddressRepository::new(state.pool())
            .save(user.id, body.kind, &body.address)
            .await?;
    }

    session
        .insert(session_keys::CHECKOUT_ADDRESS, &body.address)
        .await?;

    Ok(Json(body.address))
}

/// GET /checkout
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Json<CheckoutState>> {
    let currency = state.config().currency;
    let address = session
        .get::<ShippingAddress>(session_keys::CHECKOUT_ADDRESS)
        .await?;
    let lines = CartRepository::new(state.pool()).list(user.id).await?;
    let cart = CartView::from_lines(lines, currency)
        .ok_or_else(|| AppError::Internal("cart subtotal overflow".to_string()))?;

    let shipping = shipping_for(&cart);
    let total = cart
        .subtotal
        .checked_add(&shipping)
        .ok_or_else(|| AppError::Internal("order total overflow".to_string()))?;

    Ok(Json(CheckoutState {
        address,
        cart,
        shipping,
        total,
    }))
}

/// POST /checkout/payment/order
///
/// Creates the local pending order from the cart and a matching gateway
/// order, and returns what the hosted checkout page needs. The cart stays
/// intact until the payment verifies.
#[instrument(skip(state, session, user))]
pub async fn create_payment_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Json<PaymentOrderResponse>> {
    let address = session
        .get::<ShippingAddress>(session_keys::CHECKOUT_ADDRESS)
        .await?
        .ok_or_else(|| AppError::BadRequest("complete the address step first".to_string()))?;

    let currency = state.config().currency;
    let lines = CartRepository::new(state.pool()).list(user.id).await?;
    if lines.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let cart = CartView::from_lines(lines, currency)
        .ok_or_else(|| AppError::Internal("cart subtotal overflow".to_string()))?;
    let shipping = shipping_for(&cart);

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .create_from_cart(user.id, user.email.as_str(), &cart.lines, shipping, &address)
        .await?;

    let amount_minor = order
        .total
        .to_minor_units()
        .ok_or_else(|| AppError::Internal("order total out of range".to_string()))?;
    let gateway_order = state
        .gateway()
        .create_order(amount_minor, currency.code(), &order.order_number)
        .await?;

    orders
        .set_gateway_order(order.id, user.id, &gateway_order.id)
        .await?;

    Ok(Json(PaymentOrderResponse {
        order_id: order.id,
        order_number: order.order_number,
        gateway_order_id: gateway_order.id,
        amount: amount_minor,
        currency: currency.code().to_string(),
        key_id: state.config().payment.key_id.clone(),
    }))
}

/// POST /checkout/payment/verify
///
/// A bad signature leaves the order exactly as it was: payment status stays
/// pending and nothing else is touched.
#[instrument(skip(state, session, user, body))]
pub async fn verify_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(body): Json<VerifyBody>,
) -> Result<Json<Order>> {
    if !state
        .gateway()
        .verify_signature(&body.gateway_order_id, &body.payment_id, &body.signature)
    {
        return Err(AppError::BadRequest(
            "payment signature verification failed".to_string(),
        ));
    }

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .find_by_gateway_order(&body.gateway_order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;
    if order.user_id != user.id {
        return Err(AppError::NotFound("order".to_string()));
    }

    let order = orders.complete_payment(order.id, user.id).await?;

    session
        .remove::<ShippingAddress>(session_keys::CHECKOUT_ADDRESS)
        .await?;

    Ok(Json(order))
}

/// Flat-rate shipping: free above the threshold.
fn shipping_for(cart: &CartView) -> Price {
    const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);
    const FLAT_RATE: Decimal = Decimal::from_parts(99, 0, 0, false, 0);

    let currency = cart.subtotal.currency;
    if cart.lines.is_empty() || cart.subtotal.amount >= FREE_SHIPPING_THRESHOLD {
        Price::zero(currency)
    } else {
        Price::new(FLAT_RATE, currency)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aurelia_core::{CartItemId, CurrencyCode, ProductId};
    use crate::models::cart::CartLine;

    fn line(minor: i64, quantity: u32) -> CartLine {
        let unit_price = Price::from_minor_units(minor, CurrencyCode::INR);
        CartLine {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            name: "Gold hoops".to_string(),
            image: None,
            unit_price,
            quantity,
            line_total: unit_price.checked_mul(quantity).unwrap(),
        }
    }

    #[test]
    fn test_shipping_free_above_threshold() {
        let cart = CartView::from_lines(vec![line(600_000, 1)], CurrencyCode::INR).unwrap();
        assert_eq!(shipping_for(&cart), Price::zero(CurrencyCode::INR));
    }

    #[test]
    fn test_shipping_flat_rate_below_threshold() {
        let cart = CartView::from_lines(vec![line(149_900, 1)], CurrencyCode::INR).unwrap();
        assert_eq!(shipping_for(&cart).to_minor_units(), Some(9_900));
    }

    #[test]
    fn test_shipping_zero_for_empty_cart() {
        let cart = CartView::from_lines(Vec::new(), CurrencyCode::INR).unwrap();
        assert_eq!(shipping_for(&cart), Price::zero(CurrencyCode::INR));
    }
}
