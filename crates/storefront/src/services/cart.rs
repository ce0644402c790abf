//! Shopping cart store.
//!
//! The cart is an ordered list of lines keyed by product ID. Insertion order
//! is display order. The total is computed from the lines on every read so it
//! can never drift from them.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use mystery_sack_core::{CurrencyCode, Price, ProductId};

use crate::error::add_breadcrumb;
use crate::models::{Product, VariationSelections};

/// Errors from cart mutations. The cart is unchanged when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Adding would exceed the product's stock.
    #[error("only {available} of product {product_id} in stock (requested {requested})")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Product is priced in a different currency than the cart.
    #[error("product {product_id} is priced in {found}, cart uses {expected}")]
    CurrencyMismatch {
        product_id: ProductId,
        expected: CurrencyCode,
        found: CurrencyCode,
    },
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub product: Product,
    /// Always at least 1.
    pub quantity: u32,
    pub selected_variations: VariationSelections,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Read-only copy of the cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub total: Price,
}

impl CartSnapshot {
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, item| count.saturating_add(item.quantity))
    }
}

/// Cart for one session.
#[derive(Debug, Clone)]
pub struct CartStore {
    items: Vec<CartItem>,
    currency: CurrencyCode,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}

impl CartStore {
    /// An empty cart priced in `currency`.
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            currency,
        }
    }

    /// Add one unit of `product`.
    ///
    /// An existing line for the same product has its quantity incremented;
    /// otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// Returns `CartError::OutOfStock` if the line would exceed the product's
    /// stock, or `CartError::CurrencyMismatch` for a product priced in another
    /// currency.
    pub fn add_item(&mut self, product: &Product) -> Result<(), CartError> {
        self.add_item_with_variations(product, VariationSelections::new())
    }

    /// Add one unit of `product` with chosen variation options.
    ///
    /// Selections are recorded only when a new line is created; adding to an
    /// existing line keeps the selections it was created with.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_item`].
    pub fn add_item_with_variations(
        &mut self,
        product: &Product,
        selections: VariationSelections,
    ) -> Result<(), CartError> {
        if product.price.currency_code != self.currency {
            return Err(CartError::CurrencyMismatch {
                product_id: product.id,
                expected: self.currency,
                found: product.price.currency_code,
            });
        }

        let current = self.get(product.id).map_or(0, |item| item.quantity);
        let requested = current.saturating_add(1);
        if requested > product.stock {
            warn!(
                product_id = %product.id,
                requested,
                available = product.stock,
                "Add to cart rejected: out of stock"
            );
            return Err(CartError::OutOfStock {
                product_id: product.id,
                requested,
                available: product.stock,
            });
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.quantity = requested;
        } else {
            self.items.push(CartItem {
                product: product.clone(),
                quantity: 1,
                selected_variations: selections,
            });
        }

        debug!(product_id = %product.id, quantity = requested, "Added to cart");
        let id = product.id.to_string();
        add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
        Ok(())
    }

    /// Set a line's quantity exactly.
    ///
    /// Quantities below 1 and unknown product IDs are ignored; this never
    /// removes a line. Returns `true` if a line changed.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        let Ok(quantity) = u32::try_from(quantity) else {
            return false;
        };
        if quantity < 1 {
            return false;
        }
        let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) else {
            return false;
        };

        item.quantity = quantity;
        debug!(product_id = %product_id, quantity, "Updated cart quantity");
        true
    }

    /// Remove a line. Returns `true` if it existed.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        let removed = self.items.len() != before;
        if removed {
            debug!(product_id = %product_id, "Removed from cart");
            let id = product_id.to_string();
            add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));
        }
        removed
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        let amount = self
            .items
            .iter()
            .map(|item| item.line_total().amount)
            .sum::<Decimal>();
        Price::new(amount, self.currency)
    }

    /// Lines in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product.id == product_id)
    }

    /// Units across all lines (navigation badge). Saturates at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, item| count.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            total: self.total(),
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
