//! Catalog browsing: lookup and listing filters.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mystery_sack_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

/// Categories offered in the listing filter, after `all`.
pub const CATEGORIES: &[&str] = &[
    "apparel",
    "accessories",
    "collectibles",
    "gadgets",
    "beauty",
    "lifestyle",
    "toys",
    "stationery",
    "home",
];

/// Price bucket for the listing filter. Lower bounds are inclusive, upper
/// bounds exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriceRange {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "0-500")]
    Under500,
    #[serde(rename = "500-1000")]
    From500To1000,
    #[serde(rename = "1000-2000")]
    From1000To2000,
    #[serde(rename = "2000+")]
    From2000,
}

impl PriceRange {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Under500,
        Self::From500To1000,
        Self::From1000To2000,
        Self::From2000,
    ];

    /// Stable identifier, as used in query strings.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Under500 => "0-500",
            Self::From500To1000 => "500-1000",
            Self::From1000To2000 => "1000-2000",
            Self::From2000 => "2000+",
        }
    }

    /// `(min, max)` in whole pesos, or `None` for no restriction.
    const fn bounds(self) -> Option<(i64, Option<i64>)> {
        match self {
            Self::All => None,
            Self::Under500 => Some((0, Some(500))),
            Self::From500To1000 => Some((500, Some(1000))),
            Self::From1000To2000 => Some((1000, Some(2000))),
            Self::From2000 => Some((2000, None)),
        }
    }

    /// Whether `amount` falls in this bucket.
    #[must_use]
    pub fn contains(self, amount: Decimal) -> bool {
        self.bounds().is_none_or(|(min, max)| {
            amount >= Decimal::from(min) && max.is_none_or(|max| amount < Decimal::from(max))
        })
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.id() == s)
            .ok_or_else(|| format!("invalid price range: {s}"))
    }
}

/// Listing filter. The default matches every product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Case-insensitive substring of name or description.
    #[serde(default)]
    pub search: String,
    /// Category ID; `None` means all categories.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price_range: PriceRange,
}

impl ListingFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let query = self.search.trim().to_lowercase();
        let matches_search = query.is_empty()
            || product.name.to_lowercase().contains(&query)
            || product.description.to_lowercase().contains(&query);

        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|c| c == "all" || product.category == c);

        matches_search && matches_category && self.price_range.contains(product.price.amount)
    }
}

/// Look up a product.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` for an unknown ID.
pub fn get_product(products: &ProductRepository, id: ProductId) -> Result<&Product, RepositoryError> {
    products.require(id)
}

/// Products matching `filter`, in listing order.
#[must_use]
pub fn list_products<'a>(products: &'a ProductRepository, filter: &ListingFilter) -> Vec<&'a Product> {
    products.all().iter().filter(|p| filter.matches(p)).collect()
}
