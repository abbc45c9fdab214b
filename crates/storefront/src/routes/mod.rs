//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Health check
//! GET    /ready                         - Readiness check (database ping)
//!
//! # Catalog
//! GET    /products                      - Product listing (page, per_page, category, q)
//! GET    /products/categories           - Distinct category list
//! GET    /products/{id}                 - Product detail
//!
//! # Auth
//! POST   /auth/register                 - Create account (merges guest cart)
//! POST   /auth/login                    - Login (merges guest cart)
//! POST   /auth/logout                   - Logout
//! GET    /auth/me                       - Current user
//!
//! # Cart (guest carts live in the session; account carts in the database)
//! GET    /cart                          - Cart contents
//! POST   /cart/items                    - Add a product
//! PATCH  /cart/items/{product_id}       - Set a line's quantity
//! DELETE /cart/items/{product_id}       - Remove a line
//! DELETE /cart                          - Clear the cart
//! POST   /cart/sync                     - Merge the session guest cart (requires auth)
//!
//! # Checkout (requires auth)
//! POST   /checkout/address              - Validate and store the shipping address
//! GET    /checkout                      - Wizard state (address + totals)
//! POST   /checkout/payment/order        - Create local + gateway order
//! POST   /checkout/payment/verify       - Verify the hosted checkout signature
//!
//! # Account (requires auth)
//! GET    /account/orders                - Order history
//! GET    /account/orders/{id}           - Order detail
//! GET    /account/wishlist              - Wishlist
//! POST   /account/wishlist              - Add to wishlist
//! DELETE /account/wishlist/{product_id} - Remove from wishlist
//! GET    /account/addresses             - Saved addresses
//! POST   /account/addresses             - Save an address
//! DELETE /account/addresses/{id}        - Delete an address
//!
//! # Design assistant (requires auth)
//! POST   /assistant/sessions                     - Create a design session
//! GET    /assistant/sessions                     - List live sessions
//! GET    /assistant/sessions/{id}                - Session with message log
//! PATCH  /assistant/sessions/{id}                - Rename
//! DELETE /assistant/sessions/{id}                - Delete
//! POST   /assistant/sessions/{id}/favorite       - Favorite (capped at 5)
//! DELETE /assistant/sessions/{id}/favorite       - Unfavorite (restarts expiry)
//! POST   /assistant/sessions/{id}/messages       - Send a message, get the reply
//!
//! # Video assistant
//! POST   /assistant/video-sessions               - Request a conversation
//! GET    /assistant/video-sessions/{id}          - Session state
//! POST   /assistant/video-sessions/{id}/retry    - Retry a failed request
//! POST   /assistant/video-sessions/{id}/close    - Close
//!
//! # Newsletter
//! POST   /newsletter                    - Subscribe
//! ```

pub mod addresses;
pub mod assistant;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod video;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/categories", get(products::categories))
        .route("/{id}", get(products::show))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{product_id}",
            patch(cart::set_quantity).delete(cart::remove_item),
        )
        .route("/sync", post(cart::sync))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/address", post(checkout::set_address))
        .route("/payment/order", post(checkout::create_payment_order))
        .route("/payment/verify", post(checkout::verify_payment))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/wishlist", get(wishlist::index).post(wishlist::add))
        .route("/wishlist/{product_id}", delete(wishlist::remove))
        .route("/addresses", get(addresses::index).post(addresses::save))
        .route("/addresses/{id}", delete(addresses::remove))
}

/// Create the assistant routes router (design + video sessions).
pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions",
            post(assistant::create_session).get(assistant::list_sessions),
        )
        .route(
            "/sessions/{id}",
            get(assistant::show_session)
                .patch(assistant::rename_session)
                .delete(assistant::delete_session),
        )
        .route(
            "/sessions/{id}/favorite",
            post(assistant::favorite_session).delete(assistant::unfavorite_session),
        )
        .route("/sessions/{id}/messages", post(assistant::send_message))
        .route("/video-sessions", post(video::create))
        .route("/video-sessions/{id}", get(video::show))
        .route("/video-sessions/{id}/retry", post(video::retry))
        .route("/video-sessions/{id}/close", post(video::close))
}

/// Create the newsletter routes router.
pub fn newsletter_routes() -> Router<AppState> {
    Router::new().route("/", post(newsletter::subscribe))
}
