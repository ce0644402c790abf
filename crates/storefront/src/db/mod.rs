//! In-memory repositories for storefront data.
//!
//! # Database
//!
//! The storefront keeps everything in a single [`Database`] value owned by
//! the caller. Nothing here is global: each shopper session (or test) creates
//! its own `Database` and passes it explicitly to the operations that need it.
//!
//! ## Tables
//!
//! - `products` - Catalog, in display order ([`ProductRepository`])
//! - `users` - Accounts with Argon2 password hashes ([`UserRepository`])
//! - `orders` - Placed orders ([`OrderRepository`])
//!
//! State lives only as long as the `Database` value; dropping it discards
//! every table.

pub mod orders;
pub mod products;
pub mod seed;
pub mod users;

use thiserror::Error;

pub use orders::{NewOrder, OrderRepository};
pub use products::ProductRepository;
pub use users::{NewUser, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Requested entity was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// All storefront tables for one session.
#[derive(Debug, Default)]
pub struct Database {
    pub products: ProductRepository,
    pub users: UserRepository,
    pub orders: OrderRepository,
}

impl Database {
    /// An empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A database pre-loaded with the demo catalog and the two demo accounts
    /// (`user@example.com` / `user`, `admin@example.com` / `admin`).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing a demo password fails.
    pub fn seeded() -> Result<Self, crate::services::auth::AuthError> {
        let mut db = Self::new();
        for product in seed::products() {
            db.products.upsert(product);
        }
        for user in seed::users()? {
            db.users
                .create(user)
                .map_err(crate::services::auth::AuthError::Repository)?;
        }
        tracing::debug!(
            products = db.products.len(),
            users = db.users.len(),
            "Seeded in-memory database"
        );
        Ok(db)
    }
}
