//! Domain models for the storefront.

pub mod address;
pub mod cart;
pub mod design;
pub mod order;
pub mod product;
pub mod session;
pub mod user;
pub mod wishlist;

pub use session::{CurrentUser, keys as session_keys};
