//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! # List every product
//! ms-cli catalog list
//!
//! # Filter by search text, category and price range
//! ms-cli catalog list -s shoes -c accessories -p 500-1000
//!
//! # Show one product
//! ms-cli catalog show 2
//!
//! # Use a custom catalog instead of the built-in one
//! ms-cli --catalog products.yaml catalog list
//! ```
//!
//! # Catalog Files
//!
//! A catalog file is YAML with a top-level `products` list. Each entry uses
//! the same fields as the storefront's `Product` model:
//!
//! ```yaml
//! products:
//!   - id: 1
//!     name: Mystery Sack
//!     description: A bag of surprises
//!     image_url: /images/sack.jpg
//!     category: accessories
//!     code: ACC001
//!     price: { amount: "250", currency_code: PHP }
//!     stock: 5
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use mystery_sack_core::ProductId;
use mystery_sack_storefront::db::ProductRepository;
use mystery_sack_storefront::models::Product;
use mystery_sack_storefront::services::catalog::{ListingFilter, PriceRange};
use mystery_sack_storefront::{Database, Session, StorefrontConfig};

/// Errors that can occur while loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogFileError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// File is not valid catalog YAML.
    #[error("Invalid catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Catalog entries failed validation.
    #[error("{0} validation errors found")]
    Invalid(usize),
}

/// Top-level shape of a catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<Product>,
}

/// Parse catalog YAML.
///
/// # Errors
///
/// Returns `CatalogFileError::Parse` if the YAML does not match
/// [`CatalogFile`].
pub fn parse_catalog(content: &str) -> Result<CatalogFile, CatalogFileError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Check catalog entries, returning one message per problem.
#[must_use]
pub fn validate_catalog(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for product in &catalog.products {
        let id = product.id;
        if id.as_i32() <= 0 {
            errors.push(format!("product {id}: id must be positive"));
        }
        if !seen.insert(id) {
            errors.push(format!("product {id}: duplicate id"));
        }
        if product.name.trim().is_empty() {
            errors.push(format!("product {id}: name is required"));
        }
        if product.price.is_negative() {
            errors.push(format!("product {id}: price must not be negative"));
        }
        if product
            .original_price
            .is_some_and(|original| original.currency_code != product.price.currency_code)
        {
            errors.push(format!("product {id}: original price uses a different currency"));
        }
    }

    errors
}

/// Build the in-memory database, replacing the built-in products with the
/// contents of `catalog_path` when given.
///
/// # Errors
///
/// Returns an error if seeding the demo accounts fails or the catalog file
/// cannot be read, parsed or validated.
pub fn load_database(catalog_path: Option<&Path>) -> Result<Database, Box<dyn std::error::Error>> {
    let mut db = Database::seeded()?;

    let Some(path) = catalog_path else {
        return Ok(db);
    };

    info!(path = %path.display(), "Loading catalog from file");

    let content = std::fs::read_to_string(path).map_err(|source| CatalogFileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let catalog = parse_catalog(&content)?;

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CatalogFileError::Invalid(errors.len()).into());
    }

    db.products = ProductRepository::new();
    for product in catalog.products {
        db.products.upsert(product);
    }

    info!(products = db.products.len(), "Catalog loaded");
    Ok(db)
}

/// List products matching the given filters.
///
/// # Errors
///
/// Returns an error if `price_range` is not a known range.
pub fn list(
    db: &Database,
    config: &StorefrontConfig,
    search: Option<String>,
    category: Option<String>,
    price_range: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = ListingFilter {
        search: search.unwrap_or_default(),
        category,
        price_range: price_range
            .map(str::parse::<PriceRange>)
            .transpose()?
            .unwrap_or_default(),
    };

    let session = Session::new(config);
    let products = session.list_products(db, &filter);

    info!(
        store = %config.store_name,
        count = products.len(),
        "Products"
    );
    for product in products {
        info!(
            id = %product.id,
            price = %product.price,
            stock = %session.stock_badge(product),
            "{}",
            product.name
        );
    }
    Ok(())
}

/// Show one product's details.
///
/// # Errors
///
/// Returns an error if the product doesn't exist.
pub fn show(
    db: &Database,
    config: &StorefrontConfig,
    id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new(config);
    let product = session.product(db, id)?;

    info!(
        id = %product.id,
        code = %product.code,
        category = %product.category,
        price = %product.price,
        stock = %session.stock_badge(product),
        sold = product.sold_count,
        "{}",
        product.name
    );
    if let Some(original) = product.original_price
        && let Some(percent) = product.discount_percent()
    {
        info!(original = %original, "{percent}% off");
    }
    if let Some(countdown) = product.sale_countdown(Utc::now()) {
        info!(ends_in = %countdown, "On sale");
    }
    for variation in &product.variations {
        info!(options = %variation.options.join(", "), "{}", variation.name);
    }
    info!("{}", product.description);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
products:
  - id: 1
    name: Mystery Sack
    description: A bag of surprises
    image_url: /images/sack.jpg
    category: accessories
    code: ACC001
    price: { amount: "250", currency_code: PHP }
    stock: 5
  - id: 2
    name: Collector Box
    description: Rare finds
    image_url: /images/box.jpg
    category: collectibles
    code: COL001
    price: { amount: "1200", currency_code: PHP }
    original_price: { amount: "1500", currency_code: PHP }
    stock: 0
    variations:
      - id: 1
        name: Size
        options: [S, M, L]
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog(CATALOG).unwrap();
        assert_eq!(catalog.products.len(), 2);

        let box_product = &catalog.products[1];
        assert_eq!(box_product.discount_percent(), Some(20));
        assert_eq!(box_product.variation("Size").unwrap().options.len(), 3);
        assert!(box_product.tags.is_empty());
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn test_validate_catalog_reports_each_problem() {
        let mut catalog = parse_catalog(CATALOG).unwrap();
        catalog.products[1].id = ProductId::new(1);
        catalog.products[1].name = " ".to_string();

        let errors = validate_catalog(&catalog);
        assert_eq!(
            errors,
            vec![
                "product 1: duplicate id".to_string(),
                "product 1: name is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_catalog_rejects_missing_fields() {
        let err = parse_catalog("products:\n  - id: 1\n    name: Sack\n").unwrap_err();
        assert!(matches!(err, CatalogFileError::Parse(_)));
    }

    #[test]
    fn test_load_database_without_file_uses_seed_catalog() {
        let db = load_database(None).unwrap();
        assert_eq!(db.products.len(), 8);
        assert_eq!(db.users.len(), 2);
    }
}
