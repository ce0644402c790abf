//! Integration tests for the Mystery Sack storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mystery-sack-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Randomized cart operation sequences
//! - `checkout_flow` - Wizard steps, validation and order placement
//! - `session` - Sign-in, access gates and admin order management
//!
//! Every test builds its own [`Database`]; nothing is shared between tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::{DateTime, TimeZone, Utc};
use secrecy::SecretString;

use mystery_sack_core::{CurrencyCode, Price, ProductId};
use mystery_sack_storefront::models::{Product, VariationSelections};
use mystery_sack_storefront::{AppError, Database, Session, StorefrontConfig};

/// Seeded shopper account.
pub const USER_EMAIL: &str = "user@example.com";
/// Password of [`USER_EMAIL`].
pub const USER_PASSWORD: &str = "user";
/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@example.com";
/// Password of [`ADMIN_EMAIL`].
pub const ADMIN_PASSWORD: &str = "admin";

/// A fixed clock reading so order timestamps are reproducible.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 12, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

/// A plain PHP product with no variations.
#[must_use]
pub fn product(id: i32, price: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Mystery Sack #{id}"),
        description: "Surprise items from a Japanese mystery box".to_string(),
        image_url: format!("/images/sack-{id}.jpg"),
        category: "accessories".to_string(),
        code: format!("ACC{id:03}"),
        price: Price::whole(price, CurrencyCode::PHP),
        original_price: None,
        stock,
        rating: 0.0,
        review_count: 0,
        tags: Vec::new(),
        variations: Vec::new(),
        is_on_sale: false,
        sale_ends: None,
        sold_count: 0,
    }
}

/// A database holding the seeded accounts and only the given products.
///
/// # Errors
///
/// Returns an error if the demo accounts cannot be seeded.
pub fn database_with(products: Vec<Product>) -> Result<Database, AppError> {
    let mut db = Database::seeded()?;
    db.products = mystery_sack_storefront::db::ProductRepository::new();
    for product in products {
        db.products.upsert(product);
    }
    Ok(db)
}

/// A new session signed in with the given credentials.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` for a wrong email or password.
pub fn signed_in(db: &mut Database, email: &str, password: &str) -> Result<Session, AppError> {
    let mut session = Session::new(&StorefrontConfig::default());
    session.sign_in(db, email, &SecretString::from(password))?;
    Ok(session)
}

/// Add `product_id` to the cart `times` times.
///
/// # Errors
///
/// Returns the first add-to-cart failure.
pub fn add_times(
    session: &mut Session,
    db: &Database,
    product_id: ProductId,
    times: u32,
) -> Result<(), AppError> {
    for _ in 0..times {
        session.add_to_cart(db, product_id, VariationSelections::new())?;
    }
    Ok(())
}
