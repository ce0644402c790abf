//! Domain models for the storefront.
//!
//! These types carry data between the repositories, the shopper-facing
//! stores and the CLI. Invariants that span several models (line identity,
//! derived totals, step ordering) are enforced by the services, not here.

pub mod fulfillment;
pub mod order;
pub mod product;
pub mod user;

pub use fulfillment::{DeliveryMethod, PaymentMethod};
pub use order::{Order, OrderLine};
pub use product::{Product, ProductVariation, SaleCountdown, StockBadge, VariationSelections};
pub use user::{ProfileUpdate, User};
