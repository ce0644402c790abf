//! Mystery Sack storefront library.
//!
//! Shopper-facing state for a mystery box resale shop: catalog browsing,
//! cart, a three-step checkout wizard, mocked authentication and a small
//! admin surface. All data is held in memory in a [`db::Database`] that the
//! caller owns and passes to each [`session::Session`] operation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use config::StorefrontConfig;
pub use db::Database;
pub use error::AppError;
pub use session::{CheckoutOutcome, Session};
