//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password authentication and the per-session auth store
//! - `cart` - Cart store (line items and derived total)
//! - `catalog` - Product lookup and listing filters
//! - `checkout` - Three-step checkout wizard and order placement
//! - `admin` - Order status management and catalog edits

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
