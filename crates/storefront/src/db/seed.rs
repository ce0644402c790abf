//! Demo catalog and accounts loaded by [`Database::seeded`](super::Database::seeded).

use chrono::Utc;
use secrecy::SecretString;

use mystery_sack_core::{CurrencyCode, Email, PhoneNumber, Price, ProductId, UserRole, VariationId};

use super::NewUser;
use crate::models::{Product, ProductVariation};
use crate::services::auth::{AuthError, hash_password};

const BAG_BLURB: &str = "Stylish crossbody bag from a luxury mystery box. Like-new condition with dust bag included.";

fn accessory(id: i32, name: &str, price: i64, image: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: BAG_BLURB.to_string(),
        image_url: format!("/images/{image}"),
        category: "accessories".to_string(),
        code: "ACC001".to_string(),
        price: Price::whole(price, CurrencyCode::PHP),
        original_price: None,
        stock: 1,
        rating: 4.7,
        review_count: 8,
        tags: vec![
            "accessories".to_string(),
            "bags".to_string(),
            "fashion".to_string(),
        ],
        variations: Vec::new(),
        is_on_sale: false,
        sale_ends: None,
        sold_count: 0,
    }
}

/// The demo catalog in listing order. The first item is on a two-hour sale
/// starting now.
#[must_use]
pub fn products() -> Vec<Product> {
    let case = Product {
        id: ProductId::new(1),
        name: "TBTIC for ios iPadmini Air pro case IP10,10.9".to_string(),
        description: "Authentic collectible figure from a premium Japanese mystery box. Perfect condition with original packaging.".to_string(),
        image_url: "/images/IPADMINIPRO.jpg".to_string(),
        category: "collectibles".to_string(),
        code: "COL001".to_string(),
        price: Price::whole(250, CurrencyCode::PHP),
        original_price: Some(Price::whole(600, CurrencyCode::PHP)),
        stock: 1,
        rating: 4.8,
        review_count: 12,
        tags: vec![
            "collectibles".to_string(),
            "anime".to_string(),
            "figure".to_string(),
        ],
        variations: Vec::new(),
        is_on_sale: true,
        sale_ends: Some(Utc::now() + chrono::TimeDelta::hours(2)),
        sold_count: 0,
    };

    let mut shoes = accessory(2, "Safety Shoes", 600, "SAFETYSHOES.jpg");
    shoes.variations.push(ProductVariation {
        id: VariationId::new(1),
        name: "Size".to_string(),
        options: vec!["40".to_string(), "41".to_string(), "42".to_string()],
        price: None,
    });

    vec![
        case,
        shoes,
        accessory(3, "Flare S7", 1500, "Flare S7.jpg"),
        accessory(4, "Shoes", 500, "Shoes.jpg"),
        accessory(5, "Suomy", 250, "suomy.jpg"),
        accessory(6, "Flashchager VIVO 120 W", 350, "flashchager.jpg"),
        accessory(7, "Professional Tailors", 300, "ProfessionalTailors.jpg"),
        accessory(8, "Rotonoa Zoro", 400, "Rotonoa Zoro.jpg"),
    ]
}

/// The demo accounts with freshly hashed passwords.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn users() -> Result<Vec<NewUser>, AuthError> {
    let accounts = [
        ("user@example.com", "user", "9123456789", UserRole::User, "Test User"),
        ("admin@example.com", "admin", "9987654321", UserRole::Admin, "Admin User"),
    ];

    accounts
        .into_iter()
        .map(|(email, password, phone, role, name)| -> Result<NewUser, AuthError> {
            Ok(NewUser {
                email: Email::parse(email)?,
                phone_number: PhoneNumber::parse(phone)?,
                role,
                name: Some(name.to_string()),
                address: None,
                password_hash: hash_password(&SecretString::from(password))?,
            })
        })
        .collect()
}
