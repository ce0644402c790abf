//! Shopper session facade.
//!
//! A [`Session`] owns one shopper's auth store, cart and (while active)
//! checkout flow. Shared data lives in the [`Database`] passed to each
//! operation. Access rules:
//!
//! - Browsing needs no account.
//! - Cart, checkout, profile and order history need a signed-in user.
//! - Admin operations need the admin role.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tracing::{info, instrument};
use uuid::Uuid;

use mystery_sack_core::{OrderId, ProductId};

use crate::config::StorefrontConfig;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{
    DeliveryMethod, Order, PaymentMethod, Product, ProfileUpdate, StockBadge, User,
    VariationSelections,
};
use crate::services::admin::AdminService;
use crate::services::auth::AuthStore;
use crate::services::cart::{CartSnapshot, CartStore};
use crate::services::catalog::{self, ListingFilter};
use crate::services::checkout::{
    Advance, CheckoutError, CheckoutField, CheckoutFlow, CheckoutStep, OrderReview,
};

/// Result of continuing the checkout wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Moved to this step.
    Step(CheckoutStep),
    /// Order submitted; the cart is now empty and checkout has ended.
    Placed(Order),
}

/// One shopper's session.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    low_stock_threshold: u32,
    auth: AuthStore,
    cart: CartStore,
    checkout: Option<CheckoutFlow>,
    last_order: Option<Order>,
}

impl Session {
    /// A signed-out session with an empty cart.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "Session created");
        Self {
            id,
            low_stock_threshold: config.low_stock_threshold,
            auth: AuthStore::new(config.min_password_length),
            cart: CartStore::new(config.currency),
            checkout: None,
            last_order: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthStore {
        &self.auth
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    #[must_use]
    pub fn cart_snapshot(&self) -> CartSnapshot {
        self.cart.snapshot()
    }

    /// The active checkout, if any.
    #[must_use]
    pub const fn checkout(&self) -> Option<&CheckoutFlow> {
        self.checkout.as_ref()
    }

    /// Confirmation of the most recently placed order.
    #[must_use]
    pub const fn last_order(&self) -> Option<&Order> {
        self.last_order.as_ref()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Sign in. A checkout started by a different account is abandoned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email or password.
    #[instrument(skip_all, fields(session = %self.id))]
    pub fn sign_in(
        &mut self,
        db: &mut Database,
        email: &str,
        password: &SecretString,
    ) -> Result<&User> {
        let user_id = self.auth.sign_in(&mut db.users, email, password)?.id;
        if self.checkout.as_ref().is_some_and(|flow| flow.user_id() != user_id) {
            self.abandon_checkout();
        }
        Ok(self.auth.require_user()?)
    }

    /// Create an account. The new user still has to sign in.
    ///
    /// # Errors
    ///
    /// See [`AuthStore::sign_up`].
    #[instrument(skip_all, fields(session = %self.id))]
    pub fn sign_up(
        &mut self,
        db: &mut Database,
        email: &str,
        password: &SecretString,
        confirm_password: &SecretString,
        phone_number: &str,
    ) -> Result<User> {
        Ok(self
            .auth
            .sign_up(&mut db.users, email, password, confirm_password, phone_number)?)
    }

    /// Sign out. Any checkout in progress is abandoned.
    #[instrument(skip_all, fields(session = %self.id))]
    pub fn sign_out(&mut self) {
        self.abandon_checkout();
        self.auth.sign_out();
    }

    /// Request a password reset.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown email.
    pub fn reset_password(&self, db: &mut Database, email: &str) -> Result<()> {
        Ok(self.auth.reset_password(&mut db.users, email)?)
    }

    /// Update the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    #[instrument(skip_all, fields(session = %self.id))]
    pub fn update_profile(&mut self, db: &mut Database, update: ProfileUpdate) -> Result<&User> {
        Ok(self.auth.update_profile(&mut db.users, update)?)
    }

    /// Add or remove a product from the wishlist. Returns `true` if it is now
    /// wishlisted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown product and
    /// `AuthError::NotSignedIn` if nobody is signed in.
    pub fn toggle_wishlist(&mut self, db: &mut Database, product_id: ProductId) -> Result<bool> {
        self.auth.require_user()?;
        catalog::get_product(&db.products, product_id)?;
        Ok(self.auth.toggle_wishlist(&mut db.users, product_id)?)
    }

    pub const fn dismiss_disclaimer(&mut self) {
        self.auth.dismiss_disclaimer();
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Products matching `filter`.
    #[must_use]
    pub fn list_products<'a>(&self, db: &'a Database, filter: &ListingFilter) -> Vec<&'a Product> {
        catalog::list_products(&db.products, filter)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown ID.
    pub fn product<'a>(&self, db: &'a Database, id: ProductId) -> Result<&'a Product> {
        Ok(catalog::get_product(&db.products, id)?)
    }

    /// Stock badge using the configured low-stock threshold.
    #[must_use]
    pub const fn stock_badge(&self, product: &Product) -> StockBadge {
        product.stock_badge(self.low_stock_threshold)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of a catalog product to the cart.
    ///
    /// Each selection must name one of the product's variations and one of
    /// its options.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in,
    /// `RepositoryError::NotFound` for an unknown product,
    /// `AppError::BadRequest` for an unknown variation or option, and
    /// `CartError::OutOfStock` when stock is exhausted.
    #[instrument(skip_all, fields(session = %self.id, product_id = %product_id))]
    pub fn add_to_cart(
        &mut self,
        db: &Database,
        product_id: ProductId,
        selections: VariationSelections,
    ) -> Result<()> {
        self.auth.require_user()?;
        let product = catalog::get_product(&db.products, product_id)?;

        for (name, option) in &selections {
            let valid = product
                .variation(name)
                .is_some_and(|v| v.options.iter().any(|o| o == option));
            if !valid {
                return Err(AppError::BadRequest(format!(
                    "{name}: {option} is not available for {}",
                    product.name
                )));
            }
        }

        self.cart.add_item_with_variations(product, selections)?;
        Ok(())
    }

    /// Set a cart line's quantity. Quantities below 1 and unknown products
    /// are ignored. Returns `true` if a line changed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<bool> {
        self.auth.require_user()?;
        Ok(self.cart.update_quantity(product_id, quantity))
    }

    /// Remove a cart line. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    pub fn remove_from_cart(&mut self, product_id: ProductId) -> Result<bool> {
        self.auth.require_user()?;
        Ok(self.cart.remove_item(product_id))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Begin checkout, or resume the one in progress.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in and
    /// `CheckoutError::EmptyCart` for an empty cart.
    #[instrument(skip_all, fields(session = %self.id))]
    pub fn start_checkout(&mut self) -> Result<&CheckoutFlow> {
        let user = self.auth.require_user()?;
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }
        if self.checkout.as_ref().is_some_and(|flow| flow.user_id() != user.id) {
            self.checkout = None;
        }
        Ok(self
            .checkout
            .get_or_insert_with(|| CheckoutFlow::start(user)))
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if checkout has not started.
    pub fn set_checkout_field(&mut self, field: CheckoutField, value: &str) -> Result<()> {
        self.checkout_mut()?.set_field(field, value);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if checkout has not started.
    pub fn select_delivery(&mut self, method: DeliveryMethod) -> Result<()> {
        self.checkout_mut()?.select_delivery(method);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if checkout has not started.
    pub fn select_payment(&mut self, method: PaymentMethod) -> Result<()> {
        self.checkout_mut()?.select_payment(method);
        Ok(())
    }

    /// `continue`: advance the wizard, placing the order at the review step.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in,
    /// `AppError::BadRequest` if the signed-in user has no checkout,
    /// `CheckoutError::Validation` when delivery fields are invalid, and any
    /// placement error from [`CheckoutFlow::place_order`].
    #[instrument(skip(self, db), fields(session = %self.id))]
    pub fn continue_checkout(
        &mut self,
        db: &mut Database,
        now: DateTime<Utc>,
    ) -> Result<CheckoutOutcome> {
        let user_id = self.auth.require_user()?.id;
        if self.checkout.as_ref().is_some_and(|flow| flow.user_id() != user_id) {
            self.abandon_checkout();
        }
        let flow = self
            .checkout
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("checkout has not started".to_string()))?;

        match flow.advance()? {
            Advance::Step(step) => Ok(CheckoutOutcome::Step(step)),
            Advance::PlaceOrder => {
                let order = flow.place_order(&mut self.cart, db, now)?;
                self.checkout = None;
                self.last_order = Some(order.clone());
                Ok(CheckoutOutcome::Placed(order))
            }
        }
    }

    /// Go back one checkout step. Returns `false` at the first step.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if checkout has not started.
    pub fn checkout_back(&mut self) -> Result<bool> {
        Ok(self.checkout_mut()?.back())
    }

    /// Summary for the review step.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if checkout has not started.
    pub fn review(&self) -> Result<OrderReview> {
        let flow = self
            .checkout
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("checkout has not started".to_string()))?;
        Ok(flow.review(&self.cart))
    }

    /// Drop the checkout in progress, discarding its form data.
    pub fn abandon_checkout(&mut self) {
        if self.checkout.take().is_some() {
            info!(session = %self.id, "Checkout abandoned");
        }
    }

    fn checkout_mut(&mut self) -> Result<&mut CheckoutFlow> {
        self.checkout
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("checkout has not started".to_string()))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// The signed-in user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    pub fn my_orders<'a>(&self, db: &'a Database) -> Result<Vec<&'a Order>> {
        let user = self.auth.require_user()?;
        Ok(db.orders.list_for_user(user.id))
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` unless an admin is signed in.
    pub fn admin_orders<'a>(&self, db: &'a mut Database) -> Result<Vec<&'a Order>> {
        self.auth.require_admin()?;
        Ok(AdminService::new(db).list_orders())
    }

    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` unless an admin is signed in, or the
    /// `AdminError` from [`AdminService::advance_order`].
    #[instrument(skip(self, db), fields(session = %self.id))]
    pub fn admin_advance_order(
        &self,
        db: &mut Database,
        id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        self.auth.require_admin()?;
        Ok(AdminService::new(db).advance_order(id, now)?)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` unless an admin is signed in, or the
    /// `AdminError` from [`AdminService::cancel_order`].
    #[instrument(skip(self, db), fields(session = %self.id))]
    pub fn admin_cancel_order(
        &self,
        db: &mut Database,
        id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        self.auth.require_admin()?;
        Ok(AdminService::new(db).cancel_order(id, now)?)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` unless an admin is signed in, or
    /// `AdminError::InvalidProduct` for invalid fields.
    #[instrument(skip(self, db, product), fields(session = %self.id))]
    pub fn admin_save_product(&self, db: &mut Database, product: Product) -> Result<Product> {
        self.auth.require_admin()?;
        Ok(AdminService::new(db).upsert_product(product)?)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` unless an admin is signed in, or
    /// `AdminError::Repository` for an unknown product.
    #[instrument(skip(self, db), fields(session = %self.id))]
    pub fn admin_delete_product(&self, db: &mut Database, id: ProductId) -> Result<()> {
        self.auth.require_admin()?;
        Ok(AdminService::new(db).delete_product(id)?)
    }
}
