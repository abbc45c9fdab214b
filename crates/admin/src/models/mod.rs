//! Domain models for the back-office.

pub mod order;
pub mod product;
pub mod refund;
pub mod session;
pub mod user;

pub use session::{CurrentAdmin, keys as session_keys};
