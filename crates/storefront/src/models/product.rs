//! Product domain types and display helpers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use mystery_sack_core::{Price, ProductId, VariationId};

/// A product listed in the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
    /// Internal stock-keeping code (e.g. `ACC001`).
    pub code: String,
    pub price: Price,
    /// Pre-discount price, shown struck through.
    #[serde(default)]
    pub original_price: Option<Price>,
    pub stock: u32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variations: Vec<ProductVariation>,
    #[serde(default)]
    pub is_on_sale: bool,
    #[serde(default)]
    pub sale_ends: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sold_count: u32,
}

/// A selectable product option such as size or color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariation {
    pub id: VariationId,
    pub name: String,
    pub options: Vec<String>,
    /// Display-only price override for this variation.
    #[serde(default)]
    pub price: Option<Price>,
}

/// Variation name to chosen option, e.g. `{"Size": "M"}`.
pub type VariationSelections = BTreeMap<String, String>;

/// Stock indicator shown on product cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockBadge {
    OutOfStock,
    /// Fewer than the configured threshold remain.
    LowStock(u32),
    InStock,
}

impl fmt::Display for StockBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfStock => write!(f, "Out of Stock"),
            Self::LowStock(left) => write!(f, "Only {left} left!"),
            Self::InStock => write!(f, "In Stock"),
        }
    }
}

/// Time remaining on a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleCountdown {
    Ended,
    Remaining { hours: i64, minutes: i64 },
}

impl fmt::Display for SaleCountdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ended => write!(f, "Ended"),
            Self::Remaining { hours, minutes } => write!(f, "{hours}h {minutes}m"),
        }
    }
}

impl Product {
    /// Stock badge given the low-stock threshold.
    #[must_use]
    pub const fn stock_badge(&self, low_stock_threshold: u32) -> StockBadge {
        match self.stock {
            0 => StockBadge::OutOfStock,
            n if n < low_stock_threshold => StockBadge::LowStock(n),
            _ => StockBadge::InStock,
        }
    }

    /// Percentage off the original price, rounded to the nearest whole percent.
    ///
    /// `None` when there is no original price, the original is not positive,
    /// or the current price is not lower.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if original.currency_code != self.price.currency_code
            || original.amount <= Decimal::ZERO
            || self.price.amount >= original.amount
        {
            return None;
        }

        let percent = (original.amount - self.price.amount) / original.amount * Decimal::ONE_HUNDRED;
        percent
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
    }

    /// Countdown for an active sale window relative to `now`.
    ///
    /// `None` when the product is not on sale or has no end time.
    #[must_use]
    pub fn sale_countdown(&self, now: DateTime<Utc>) -> Option<SaleCountdown> {
        if !self.is_on_sale {
            return None;
        }
        let ends = self.sale_ends?;
        let left = ends - now;
        if left <= chrono::TimeDelta::zero() {
            return Some(SaleCountdown::Ended);
        }
        Some(SaleCountdown::Remaining {
            hours: left.num_hours(),
            minutes: left.num_minutes() % 60,
        })
    }

    /// Look up a variation by name.
    #[must_use]
    pub fn variation(&self, name: &str) -> Option<&ProductVariation> {
        self.variations.iter().find(|v| v.name == name)
    }
}
