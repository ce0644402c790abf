//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for session-level operations. Callers
//! show [`AppError::user_message`] to the shopper and report server errors
//! with [`AppError::capture`].

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::services::admin::AdminError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart mutation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout step or order placement failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Admin operation failed.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Operation not valid in the current session state.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error indicates a fault in the storefront rather than in
    /// the shopper's input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Auth(AuthError::PasswordHash))
    }

    /// Send server errors to Sentry. Other errors are ignored.
    pub fn capture(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }

    /// The single message shown to the shopper.
    ///
    /// Internal details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => "Something went wrong, please try again".to_string(),
            Self::Database(RepositoryError::NotFound(what)) => format!("Not found: {what}"),
            Self::Database(RepositoryError::Conflict(_)) => "That record already exists".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::UserAlreadyExists => "Email already exists".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::PasswordMismatch => "Passwords do not match".to_string(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::InvalidPhone(_) => "Phone number must be 10 digits".to_string(),
                AuthError::NotSignedIn => "Please sign in to continue".to_string(),
                AuthError::Forbidden => "Admin access required".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Authentication error".to_string()
                }
            },
            Self::Cart(CartError::OutOfStock { available: 0, .. }) => {
                "This item is out of stock".to_string()
            }
            Self::Cart(CartError::OutOfStock { available, .. }) => {
                format!("Only {available} left in stock")
            }
            Self::Cart(CartError::CurrencyMismatch { .. }) => {
                "This item cannot be added to your cart".to_string()
            }
            Self::Checkout(err) => match err {
                CheckoutError::Validation(validation) => validation.to_string(),
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::NotAtReview(_) => "Please review your order first".to_string(),
                CheckoutError::ProductUnavailable(_) => {
                    "An item in your cart is no longer available".to_string()
                }
                CheckoutError::Cart(cart) => Self::Cart(cart.clone()).user_message(),
            },
            Self::Admin(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
