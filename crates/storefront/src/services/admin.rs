//! Admin operations: order status management and catalog edits.
//!
//! Callers must check the admin role first (see
//! [`AuthStore::require_admin`](super::auth::AuthStore::require_admin)).

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use mystery_sack_core::{OrderId, OrderStatus, ProductId};

use crate::db::{Database, RepositoryError};
use crate::models::{Order, Product};

/// Errors from admin operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// The order's status does not allow the requested change.
    #[error("order {order_id} is {status} and cannot be {action}")]
    InvalidTransition {
        order_id: OrderId,
        status: OrderStatus,
        action: &'static str,
    },

    /// Product fields are invalid.
    #[error("invalid product: {0}")]
    InvalidProduct(String),

    /// Repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Admin service over one database.
pub struct AdminService<'a> {
    db: &'a mut Database,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// All orders, newest first.
    #[must_use]
    pub fn list_orders(self) -> Vec<&'a Order> {
        let db: &'a Database = self.db;
        db.orders.list().iter().rev().collect()
    }

    /// Move an order one step along `pending -> processing -> shipped ->
    /// delivered`. Shipping assigns a tracking number.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidTransition` for delivered or cancelled
    /// orders and `AdminError::Repository` for an unknown order.
    pub fn advance_order(&mut self, id: OrderId, now: DateTime<Utc>) -> Result<Order, AdminError> {
        let order = self.db.orders.get_mut(id)?;
        let next = order.status.next().ok_or(AdminError::InvalidTransition {
            order_id: id,
            status: order.status,
            action: "advanced",
        })?;

        if next == OrderStatus::Shipped && order.tracking_number.is_none() {
            order.tracking_number = Some(tracking_number(id));
        }
        order.status = next;
        order.updated_at = now;

        info!(order_id = %id, status = %next, "Order status advanced");
        Ok(order.clone())
    }

    /// Cancel an order that has not shipped. Stock is returned to the
    /// catalog.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidTransition` once the order has shipped or
    /// was already cancelled, and `AdminError::Repository` for an unknown
    /// order.
    pub fn cancel_order(&mut self, id: OrderId, now: DateTime<Utc>) -> Result<Order, AdminError> {
        let order = self.db.orders.get_mut(id)?;
        if !order.status.is_cancellable() {
            return Err(AdminError::InvalidTransition {
                order_id: id,
                status: order.status,
                action: "cancelled",
            });
        }
        order.status = OrderStatus::Cancelled;
        order.updated_at = now;
        let order = order.clone();

        for line in &order.lines {
            if let Some(product) = self.db.products.get_mut(line.product_id) {
                product.stock = product.stock.saturating_add(line.quantity);
                product.sold_count = product.sold_count.saturating_sub(line.quantity);
            }
        }

        info!(order_id = %id, "Order cancelled");
        Ok(order)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Create or replace a product. A product with ID 0 gets the next free ID.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidProduct` for a blank name or a negative
    /// price.
    pub fn upsert_product(&mut self, mut product: Product) -> Result<Product, AdminError> {
        if product.name.trim().is_empty() {
            return Err(AdminError::InvalidProduct("name is required".to_string()));
        }
        if product.price.is_negative() {
            return Err(AdminError::InvalidProduct(
                "price must not be negative".to_string(),
            ));
        }
        if product.id.as_i32() == 0 {
            product.id = self.db.products.next_id();
        }

        let replaced = self.db.products.upsert(product.clone());
        info!(product_id = %product.id, replaced, "Product saved");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the product doesn't exist.
    pub fn delete_product(&mut self, id: ProductId) -> Result<(), AdminError> {
        if !self.db.products.delete(id) {
            return Err(RepositoryError::NotFound(format!("product {id}")).into());
        }
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

fn tracking_number(id: OrderId) -> String {
    format!("MS{:08}PH", id.as_i32())
}
