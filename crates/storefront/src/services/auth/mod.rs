//! Authentication service and per-session auth store.
//!
//! [`AuthService`] performs the account operations against a
//! [`UserRepository`]. [`AuthStore`] holds the identity of one shopping
//! session and gates the operations that need a signed-in user or an admin.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use mystery_sack_core::{Email, PhoneNumber, ProductId, UserRole};

use crate::db::{NewUser, RepositoryError, UserRepository};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{ProfileUpdate, User};

/// Default minimum password length for sign-up.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
///
/// Handles registration, login and password reset requests.
pub struct AuthService<'a> {
    users: &'a mut UserRepository,
    min_password_length: usize,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a mut UserRepository, min_password_length: usize) -> Self {
        Self {
            users,
            min_password_length,
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new shopper account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::PasswordMismatch` if the confirmation differs.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::InvalidPhone` if the phone number isn't 10 digits.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub fn register_with_password(
        &mut self,
        email: &str,
        password: &SecretString,
        confirm_password: &SecretString,
        phone_number: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        if password.expose_secret() != confirm_password.expose_secret() {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(password, self.min_password_length)?;

        let phone_number = PhoneNumber::parse(phone_number)?;

        if self.users.get_by_email(&email).is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(NewUser {
                email,
                phone_number,
                role: UserRole::User,
                name: None,
                address: None,
                password_hash,
            })
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, "Registered new account");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub fn login_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, password_hash)?;

        Ok(user.clone())
    }

    /// Request a password reset for an account.
    ///
    /// No mail is sent; the request is only recorded in the log.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has this email.
    pub fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let user = self
            .users
            .get_by_email(&email)
            .ok_or(AuthError::UserNotFound)?;
        info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Persist a modified user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user no longer exists.
    pub fn save_user(&mut self, user: User) -> Result<(), AuthError> {
        self.users.update(user).map_err(|e| match e {
            RepositoryError::NotFound(_) => AuthError::UserNotFound,
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        })
    }
}

// =============================================================================
// Auth Store
// =============================================================================

/// Identity state for one session.
#[derive(Debug, Clone)]
pub struct AuthStore {
    user: Option<User>,
    show_disclaimer: bool,
    min_password_length: usize,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

impl AuthStore {
    /// A signed-out store.
    #[must_use]
    pub const fn new(min_password_length: usize) -> Self {
        Self {
            user: None,
            show_disclaimer: false,
            min_password_length,
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether the mystery sack disclaimer should be shown.
    #[must_use]
    pub const fn show_disclaimer(&self) -> bool {
        self.show_disclaimer
    }

    pub const fn dismiss_disclaimer(&mut self) {
        self.show_disclaimer = false;
    }

    /// Sign in with email and password.
    ///
    /// Regular users get the disclaimer flag raised; admins do not.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// The current user is unchanged on failure.
    pub fn sign_in(
        &mut self,
        users: &mut UserRepository,
        email: &str,
        password: &SecretString,
    ) -> Result<&User, AuthError> {
        let service = AuthService::new(users, self.min_password_length);
        let user = match service.login_with_password(email, password) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Sign-in rejected");
                return Err(e);
            }
        };

        info!(user_id = %user.id, role = %user.role, "Signed in");
        set_sentry_user(&user.id, Some(user.email.as_str()));
        add_breadcrumb("auth", "Signed in", None);

        self.show_disclaimer = user.role == UserRole::User;
        Ok(self.user.insert(user))
    }

    /// Create a shopper account. The new user is not signed in.
    ///
    /// # Errors
    ///
    /// See [`AuthService::register_with_password`].
    pub fn sign_up(
        &self,
        users: &mut UserRepository,
        email: &str,
        password: &SecretString,
        confirm_password: &SecretString,
        phone_number: &str,
    ) -> Result<User, AuthError> {
        AuthService::new(users, self.min_password_length).register_with_password(
            email,
            password,
            confirm_password,
            phone_number,
        )
    }

    /// Forget the signed-in user.
    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "Signed out");
            add_breadcrumb("auth", "Signed out", None);
        }
        self.show_disclaimer = false;
        clear_sentry_user();
    }

    /// Request a password reset.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has this email.
    pub fn reset_password(&self, users: &mut UserRepository, email: &str) -> Result<(), AuthError> {
        AuthService::new(users, self.min_password_length).request_password_reset(email)
    }

    /// Merge a profile patch into the signed-in user and persist it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    pub fn update_profile(
        &mut self,
        users: &mut UserRepository,
        update: ProfileUpdate,
    ) -> Result<&User, AuthError> {
        let mut user = self.require_user()?.clone();
        user.apply(update);
        AuthService::new(users, self.min_password_length).save_user(user.clone())?;
        Ok(self.user.insert(user))
    }

    /// Add or remove a product from the signed-in user's wishlist.
    ///
    /// Returns `true` if the product is now wishlisted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    pub fn toggle_wishlist(
        &mut self,
        users: &mut UserRepository,
        product_id: ProductId,
    ) -> Result<bool, AuthError> {
        let mut wishlist = self.require_user()?.wishlist.clone();
        let added = wishlist.insert(product_id);
        if !added {
            wishlist.remove(&product_id);
        }
        self.update_profile(
            users,
            ProfileUpdate {
                wishlist: Some(wishlist),
                ..ProfileUpdate::default()
            },
        )?;
        Ok(added)
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    pub fn require_user(&self) -> Result<&User, AuthError> {
        self.user.as_ref().ok_or(AuthError::NotSignedIn)
    }

    /// The signed-in user, who must be an admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    /// Returns `AuthError::Forbidden` if the user is not an admin.
    pub fn require_admin(&self) -> Result<&User, AuthError> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password meets requirements.
fn validate_password(password: &SecretString, min_length: usize) -> Result<(), AuthError> {
    if password.expose_secret().chars().count() < min_length {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {min_length} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &SecretString) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &SecretString, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.expose_secret().as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
