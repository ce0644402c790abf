//! Scripted checkout: sign in, fill the cart and place an order in one
//! session.
//!
//! # Usage
//!
//! ```bash
//! ms-cli checkout -e user@example.com -P user \
//!     -i 1 -i "2:Size=41" \
//!     --name "Juan Dela Cruz" --phone 09171234567 --address "123 Mango St, Salitran" \
//!     --delivery cod --payment gcash
//! ```
//!
//! Delivery fields left out fall back to the signed-in user's profile.

use chrono::Utc;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, warn};

use mystery_sack_core::ProductId;
use mystery_sack_storefront::models::{DeliveryMethod, PaymentMethod, VariationSelections};
use mystery_sack_storefront::services::checkout::{CheckoutField, CheckoutStep};
use mystery_sack_storefront::{CheckoutOutcome, Database, Session, StorefrontConfig};

/// Errors from parsing an `--item` argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemArgError {
    #[error("invalid product id '{id}': {source}")]
    InvalidId {
        id: String,
        source: std::num::ParseIntError,
    },

    #[error("expected Name=Option, got '{0}'")]
    InvalidSelection(String),
}

/// A product to add to the cart, with optional variation choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemArg {
    pub product_id: ProductId,
    pub selections: VariationSelections,
}

/// Parse `ID` or `ID:Name=Option,Name=Option`.
///
/// # Errors
///
/// Returns `ItemArgError::InvalidId` for a non-numeric id and
/// `ItemArgError::InvalidSelection` for a choice without `=`.
pub fn parse_item(s: &str) -> Result<ItemArg, ItemArgError> {
    let (id, rest) = s.split_once(':').unwrap_or((s, ""));
    let product_id = id
        .parse::<ProductId>()
        .map_err(|source| ItemArgError::InvalidId {
            id: id.to_string(),
            source,
        })?;

    let mut selections = VariationSelections::new();
    for pair in rest.split(',').filter(|p| !p.trim().is_empty()) {
        let (name, option) = pair
            .split_once('=')
            .ok_or_else(|| ItemArgError::InvalidSelection(pair.to_string()))?;
        selections.insert(name.trim().to_string(), option.trim().to_string());
    }

    Ok(ItemArg {
        product_id,
        selections,
    })
}

/// Everything needed to run one checkout.
#[derive(Debug)]
pub struct CheckoutRequest {
    pub email: String,
    pub password: SecretString,
    pub items: Vec<ItemArg>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
}

/// Run a checkout from sign-in to order confirmation.
///
/// # Errors
///
/// Returns the first storefront error, such as invalid credentials, an
/// out-of-stock product or invalid delivery details.
pub fn run(
    db: &mut Database,
    config: &StorefrontConfig,
    request: CheckoutRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(config);
    session
        .sign_in(db, &request.email, &request.password)
        .map_err(|e| e.user_message())?;
    session.dismiss_disclaimer();

    for item in request.items {
        session
            .add_to_cart(db, item.product_id, item.selections)
            .map_err(|e| e.user_message())?;
    }
    let cart = session.cart_snapshot();
    info!(items = cart.item_count(), total = %cart.total, "Cart ready");

    session.start_checkout()?;
    let fields = [
        (CheckoutField::Name, request.name),
        (CheckoutField::PhoneNumber, request.phone_number),
        (CheckoutField::Address, request.address),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            session.set_checkout_field(field, &value)?;
        }
    }
    session.select_delivery(request.delivery_method)?;
    session.select_payment(request.payment_method)?;

    loop {
        match session.continue_checkout(db, Utc::now()) {
            Ok(CheckoutOutcome::Step(step)) => {
                info!(step = %step, "Checkout step");
                if step == CheckoutStep::Review {
                    let review = session.review()?;
                    for line in &review.items {
                        info!(
                            quantity = line.quantity,
                            total = %line.line_total(),
                            "{}",
                            line.product.name
                        );
                    }
                    info!(total = %review.total, "Order total");
                }
            }
            Ok(CheckoutOutcome::Placed(order)) => {
                info!(
                    order_id = %order.id,
                    status = %order.status,
                    total = %order.total,
                    delivery = %order.delivery_method,
                    payment = %order.payment_method,
                    "Order placed"
                );
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "Checkout stopped");
                e.capture();
                return Err(e.user_message().into());
            }
        }
    }
}
