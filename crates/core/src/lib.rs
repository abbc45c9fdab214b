//! Aurelia Core - Shared types library.
//!
//! This crate provides common types used across all Aurelia components:
//! - `storefront` - Public-facing shop API (cart, checkout, assistant)
//! - `admin` - Internal back-office (orders, refunds, users, products)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, statuses, and the role
//!   hierarchy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
