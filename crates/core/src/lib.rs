//! Mystery Sack Core - Shared types library.
//!
//! This crate provides common types used across all Mystery Sack components:
//! - `storefront` - Cart, checkout, auth and catalog state for a shopper session
//! - `cli` - Command-line tools for browsing the catalog and running a checkout
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no clocks,
//! no logging. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, contact details and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
