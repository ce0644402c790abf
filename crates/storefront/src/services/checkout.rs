//! Checkout wizard.
//!
//! A linear three-step flow: `Delivery -> Payment -> Review`. Each step keeps
//! its fields when the shopper moves back and forth; only one step is active
//! at a time. Continuing from `Review` means "place the order", which the
//! caller performs with [`CheckoutFlow::place_order`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use mystery_sack_core::{PhoneNumber, Price, ProductId, UserId};

use super::cart::{CartError, CartItem, CartStore};
use crate::db::{Database, NewOrder};
use crate::error::add_breadcrumb;
use crate::models::{DeliveryMethod, Order, OrderLine, PaymentMethod, User};

// =============================================================================
// Steps and Form
// =============================================================================

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Delivery,
    Payment,
    Review,
}

impl CheckoutStep {
    /// The step `continue` moves to, or `None` at the last step.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Delivery => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// The step `back` moves to, or `None` at the first step.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Delivery => None,
            Self::Payment => Some(Self::Delivery),
            Self::Review => Some(Self::Payment),
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivery => write!(f, "delivery"),
            Self::Payment => write!(f, "payment"),
            Self::Review => write!(f, "review"),
        }
    }
}

/// Free-text fields on the delivery step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    Name,
    PhoneNumber,
    Address,
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::PhoneNumber => write!(f, "phone number"),
            Self::Address => write!(f, "address"),
        }
    }
}

/// Everything the shopper enters during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct CheckoutFormData {
    pub name: String,
    pub phone_number: String,
    pub address: String,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
}

impl CheckoutFormData {
    /// Form prefilled from the user's profile, with the first delivery and
    /// payment methods selected.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self {
            name: user.name.clone().unwrap_or_default(),
            phone_number: user.phone_number.as_str().to_string(),
            address: user.address.clone().unwrap_or_default(),
            delivery_method: DeliveryMethod::default(),
            payment_method: PaymentMethod::default(),
        }
    }

    #[must_use]
    pub fn field(&self, field: CheckoutField) -> &str {
        match field {
            CheckoutField::Name => &self.name,
            CheckoutField::PhoneNumber => &self.phone_number,
            CheckoutField::Address => &self.address,
        }
    }

    /// Check the delivery fields.
    ///
    /// # Errors
    ///
    /// Returns every problem found, in field order.
    pub fn validate(&self) -> Result<DeliveryDetails, ValidationError> {
        let mut issues = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            issues.push(FieldIssue::missing(CheckoutField::Name));
        }

        let phone_number = if self.phone_number.trim().is_empty() {
            issues.push(FieldIssue::missing(CheckoutField::PhoneNumber));
            None
        } else {
            match PhoneNumber::parse(&self.phone_number) {
                Ok(phone) => Some(phone),
                Err(e) => {
                    issues.push(FieldIssue {
                        field: CheckoutField::PhoneNumber,
                        problem: FieldProblem::InvalidPhone(e.to_string()),
                    });
                    None
                }
            }
        };

        let address = self.address.trim();
        if address.is_empty() {
            issues.push(FieldIssue::missing(CheckoutField::Address));
        } else if !self.delivery_method.serves(address) {
            issues.push(FieldIssue {
                field: CheckoutField::Address,
                problem: FieldProblem::OutsideServiceArea(self.delivery_method),
            });
        }

        match phone_number {
            Some(phone_number) if issues.is_empty() => Ok(DeliveryDetails {
                recipient_name: name.to_string(),
                phone_number,
                address: address.to_string(),
                delivery_method: self.delivery_method,
            }),
            _ => Err(ValidationError { issues }),
        }
    }
}

/// Delivery fields after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryDetails {
    pub recipient_name: String,
    pub phone_number: PhoneNumber,
    pub address: String,
    pub delivery_method: DeliveryMethod,
}

// =============================================================================
// Errors
// =============================================================================

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldProblem {
    /// Blank after trimming.
    Missing,
    /// Not a PH mobile number.
    InvalidPhone(String),
    /// Address is not in the delivery method's service area.
    OutsideServiceArea(DeliveryMethod),
}

/// A single field problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: CheckoutField,
    pub problem: FieldProblem,
}

impl FieldIssue {
    const fn missing(field: CheckoutField) -> Self {
        Self {
            field,
            problem: FieldProblem::Missing,
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            FieldProblem::Missing => write!(f, "{} is required", self.field),
            FieldProblem::InvalidPhone(reason) => write!(f, "{}: {reason}", self.field),
            FieldProblem::OutsideServiceArea(method) => {
                let areas = method.available_locations().unwrap_or_default().join(", ");
                write!(f, "{method} is only available in {areas}")
            }
        }
    }
}

/// Delivery step failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}", display_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    #[must_use]
    pub fn fields(&self) -> Vec<CheckoutField> {
        self.issues.iter().map(|issue| issue.field).collect()
    }
}

fn display_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from the checkout flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Delivery fields are missing or invalid.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Checkout needs at least one cart line.
    #[error("cart is empty")]
    EmptyCart,

    /// `place_order` called before reaching the review step.
    #[error("cannot place order from the {0} step")]
    NotAtReview(CheckoutStep),

    /// A cart line references a product no longer in the catalog.
    #[error("product {0} is no longer available")]
    ProductUnavailable(ProductId),

    /// Stock changed since the item was added.
    #[error(transparent)]
    Cart(#[from] CartError),
}

// =============================================================================
// Flow
// =============================================================================

/// Result of `continue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to this step.
    Step(CheckoutStep),
    /// At review: the caller should place the order.
    PlaceOrder,
}

/// Read-only summary shown on the review step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderReview {
    pub items: Vec<CartItem>,
    pub total: Price,
    pub form: CheckoutFormData,
}

/// Checkout state for one session.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    user_id: UserId,
    step: CheckoutStep,
    form: CheckoutFormData,
}

impl CheckoutFlow {
    /// Begin checkout at the delivery step with the user's defaults.
    #[must_use]
    pub fn start(user: &User) -> Self {
        debug!(user_id = %user.id, "Checkout started");
        add_breadcrumb("checkout", "Started checkout", None);
        Self {
            user_id: user.id,
            step: CheckoutStep::Delivery,
            form: CheckoutFormData::for_user(user),
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn form(&self) -> &CheckoutFormData {
        &self.form
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Overwrite a free-text field.
    pub fn set_field(&mut self, field: CheckoutField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CheckoutField::Name => self.form.name = value,
            CheckoutField::PhoneNumber => self.form.phone_number = value,
            CheckoutField::Address => self.form.address = value,
        }
    }

    pub const fn select_delivery(&mut self, method: DeliveryMethod) {
        self.form.delivery_method = method;
    }

    pub const fn select_payment(&mut self, method: PaymentMethod) {
        self.form.payment_method = method;
    }

    /// `continue`: move forward one step.
    ///
    /// Leaving `Delivery` requires valid delivery fields. At `Review` the
    /// step does not change and [`Advance::PlaceOrder`] is returned.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` from `Delivery` when fields are
    /// missing or invalid; the step is unchanged.
    pub fn advance(&mut self) -> Result<Advance, CheckoutError> {
        if self.step == CheckoutStep::Delivery
            && let Err(e) = self.form.validate()
        {
            warn!(fields = ?e.fields(), "Checkout blocked at delivery");
            return Err(e.into());
        }

        let Some(next) = self.step.next() else {
            return Ok(Advance::PlaceOrder);
        };
        debug!(from = %self.step, to = %next, "Checkout advanced");
        self.step = next;
        Ok(Advance::Step(next))
    }

    /// Move back one step, keeping all form data. Returns `false` at the
    /// first step.
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) => {
                debug!(from = %self.step, to = %previous, "Checkout went back");
                self.step = previous;
                true
            }
            None => false,
        }
    }

    /// Summary of the cart and form for the review step.
    #[must_use]
    pub fn review(&self, cart: &CartStore) -> OrderReview {
        let snapshot = cart.snapshot();
        OrderReview {
            items: snapshot.items,
            total: snapshot.total,
            form: self.form.clone(),
        }
    }

    /// Submit the order.
    ///
    /// Re-validates the form, re-checks stock against the catalog, records
    /// the order, decrements stock, bumps sold counts and clears the cart.
    /// Nothing is modified if any check fails.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotAtReview` unless the flow is at `Review`,
    /// `CheckoutError::EmptyCart` for an empty cart, `CheckoutError::Validation`
    /// for invalid fields, `CheckoutError::ProductUnavailable` if a product was
    /// removed and `CheckoutError::Cart` if stock ran out.
    pub fn place_order(
        &self,
        cart: &mut CartStore,
        db: &mut Database,
        now: DateTime<Utc>,
    ) -> Result<Order, CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::NotAtReview(self.step));
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let details = self.form.validate()?;

        let mut lines = Vec::with_capacity(cart.line_count());
        for item in cart.items() {
            let product = db
                .products
                .get(item.product.id)
                .ok_or(CheckoutError::ProductUnavailable(item.product.id))?;
            if item.quantity > product.stock {
                return Err(CartError::OutOfStock {
                    product_id: product.id,
                    requested: item.quantity,
                    available: product.stock,
                }
                .into());
            }
            lines.push(OrderLine {
                product_id: item.product.id,
                name: item.product.name.clone(),
                unit_price: item.product.price,
                quantity: item.quantity,
                selected_variations: item.selected_variations.clone(),
            });
        }

        for line in &lines {
            if let Some(product) = db.products.get_mut(line.product_id) {
                product.stock -= line.quantity;
                product.sold_count = product.sold_count.saturating_add(line.quantity);
            }
        }

        let order = db.orders.insert(
            NewOrder {
                user_id: self.user_id,
                lines,
                total: cart.total(),
                recipient_name: details.recipient_name,
                phone_number: details.phone_number,
                address: details.address,
                delivery_method: details.delivery_method,
                payment_method: self.form.payment_method,
            },
            now,
        );
        cart.clear();

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total,
            items = order.item_count(),
            "Order placed"
        );
        let id = order.id.to_string();
        add_breadcrumb("checkout", "Placed order", Some(&[("order_id", id.as_str())]));
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use mystery_sack_core::{CurrencyCode, Email, LoyaltyTier, UserRole};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("user@example.com").unwrap(),
            phone_number: PhoneNumber::parse("9123456789").unwrap(),
            role: UserRole::User,
            name: Some("Test User".to_string()),
            address: None,
            billing_address: None,
            wishlist: BTreeSet::new(),
            points: 0,
            tier: LoyaltyTier::Bronze,
            joined_at: Utc::now(),
        }
    }

    fn fill(flow: &mut CheckoutFlow) {
        flow.set_field(CheckoutField::Name, "Juan Dela Cruz");
        flow.set_field(CheckoutField::PhoneNumber, "9171234567");
        flow.set_field(CheckoutField::Address, "123 Mango St");
    }

    #[test]
    fn test_start_uses_profile_defaults() {
        let flow = CheckoutFlow::start(&user());
        assert_eq!(flow.step(), CheckoutStep::Delivery);
        assert_eq!(flow.form().name, "Test User");
        assert_eq!(flow.form().phone_number, "9123456789");
        assert_eq!(flow.form().address, "");
        assert_eq!(flow.form().delivery_method, DeliveryMethod::StorePickup);
        assert_eq!(flow.form().payment_method, PaymentMethod::GCash);
    }

    #[test]
    fn test_forward_and_back_preserve_fields() {
        let mut flow = CheckoutFlow::start(&user());
        fill(&mut flow);
        assert_eq!(flow.advance().unwrap(), Advance::Step(CheckoutStep::Payment));
        flow.select_payment(PaymentMethod::UnionBank);
        assert_eq!(flow.advance().unwrap(), Advance::Step(CheckoutStep::Review));

        assert!(flow.back());
        assert_eq!(flow.step(), CheckoutStep::Payment);
        assert_eq!(flow.form().payment_method, PaymentMethod::UnionBank);

        assert!(flow.back());
        assert_eq!(flow.step(), CheckoutStep::Delivery);
        assert_eq!(flow.form().name, "Juan Dela Cruz");
        assert_eq!(flow.form().phone_number, "9171234567");
        assert_eq!(flow.form().address, "123 Mango St");
        assert!(!flow.back());
    }

    #[test]
    fn test_empty_name_blocks_delivery() {
        let mut flow = CheckoutFlow::start(&user());
        fill(&mut flow);
        flow.set_field(CheckoutField::Name, "   ");
        let err = flow.advance().unwrap_err();
        let CheckoutError::Validation(validation) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(validation.fields(), vec![CheckoutField::Name]);
        assert_eq!(flow.step(), CheckoutStep::Delivery);
    }

    #[test]
    fn test_validation_collects_every_issue() {
        let mut flow = CheckoutFlow::start(&user());
        flow.set_field(CheckoutField::Name, "");
        flow.set_field(CheckoutField::PhoneNumber, "12ab");
        flow.set_field(CheckoutField::Address, "");
        let err = flow.form().validate().unwrap_err();
        assert_eq!(
            err.fields(),
            vec![
                CheckoutField::Name,
                CheckoutField::PhoneNumber,
                CheckoutField::Address
            ]
        );
        assert!(err.to_string().starts_with("name is required; phone number: "));
    }

    #[test]
    fn test_cod_requires_service_area() {
        let mut flow = CheckoutFlow::start(&user());
        fill(&mut flow);
        flow.select_delivery(DeliveryMethod::CashOnDelivery);
        let err = flow.form().validate().unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue {
                field: CheckoutField::Address,
                problem: FieldProblem::OutsideServiceArea(DeliveryMethod::CashOnDelivery),
            }]
        );
        flow.set_field(CheckoutField::Address, "Blk 2, Paliparan III, Dasmariñas");
        assert!(flow.advance().is_ok());
    }

    #[test]
    fn test_continue_at_review_requests_placement() {
        let mut flow = CheckoutFlow::start(&user());
        fill(&mut flow);
        flow.advance().unwrap();
        flow.advance().unwrap();
        assert_eq!(flow.advance().unwrap(), Advance::PlaceOrder);
        assert_eq!(flow.step(), CheckoutStep::Review);
    }

    #[test]
    fn test_place_order_only_from_review() {
        let mut db = Database::new();
        let mut cart = CartStore::new(CurrencyCode::PHP);
        let flow = CheckoutFlow::start(&user());
        assert_eq!(
            flow.place_order(&mut cart, &mut db, Utc::now()),
            Err(CheckoutError::NotAtReview(CheckoutStep::Delivery))
        );
    }

    #[test]
    fn test_place_order_with_empty_cart() {
        let mut db = Database::new();
        let mut cart = CartStore::new(CurrencyCode::PHP);
        let mut flow = CheckoutFlow::start(&user());
        fill(&mut flow);
        flow.advance().unwrap();
        flow.advance().unwrap();
        assert_eq!(
            flow.place_order(&mut cart, &mut db, Utc::now()),
            Err(CheckoutError::EmptyCart)
        );
    }
}
