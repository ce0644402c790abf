//! User repository.
//!
//! Accounts are keyed by ID and indexed by email. Password hashes are stored
//! next to the user but only handed out through [`UserRepository::get_password_hash`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;

use mystery_sack_core::{Email, LoyaltyTier, PhoneNumber, UserId, UserRole};

use super::RepositoryError;
use crate::models::User;

/// Fields needed to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub phone_number: PhoneNumber,
    pub role: UserRole,
    pub name: Option<String>,
    pub address: Option<String>,
    /// Argon2 PHC string.
    pub password_hash: String,
}

#[derive(Debug)]
struct UserRow {
    user: User,
    password_hash: String,
}

/// Account table.
#[derive(Debug, Default)]
pub struct UserRepository {
    rows: BTreeMap<UserId, UserRow>,
}

impl UserRepository {
    /// Create an empty user repository.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a user by their email address.
    #[must_use]
    pub fn get_by_email(&self, email: &Email) -> Option<&User> {
        self.rows
            .values()
            .map(|row| &row.user)
            .find(|user| &user.email == email)
    }

    /// Get a user by their ID.
    #[must_use]
    pub fn get_by_id(&self, id: UserId) -> Option<&User> {
        self.rows.get(&id).map(|row| &row.user)
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub fn create(&mut self, new_user: NewUser) -> Result<User, RepositoryError> {
        if self.get_by_email(&new_user.email).is_some() {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let next = self.rows.keys().last().map_or(0, |id| id.as_i32()) + 1;
        let user = User {
            id: UserId::new(next),
            email: new_user.email,
            phone_number: new_user.phone_number,
            role: new_user.role,
            name: new_user.name,
            address: new_user.address,
            billing_address: None,
            wishlist: BTreeSet::new(),
            points: 0,
            tier: LoyaltyTier::default(),
            joined_at: Utc::now(),
        };
        self.rows.insert(
            user.id,
            UserRow {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );
        Ok(user)
    }

    /// Get the password hash for a user by email.
    ///
    /// Returns the user and their password hash if found.
    #[must_use]
    pub fn get_password_hash(&self, email: &Email) -> Option<(&User, &str)> {
        self.rows
            .values()
            .find(|row| &row.user.email == email)
            .map(|row| (&row.user, row.password_hash.as_str()))
    }

    /// Store a modified user, keyed by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the email now collides with
    /// another account.
    pub fn update(&mut self, user: User) -> Result<(), RepositoryError> {
        if self
            .rows
            .values()
            .any(|row| row.user.email == user.email && row.user.id != user.id)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let row = self
            .rows
            .get_mut(&user.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", user.id)))?;
        row.user = user;
        Ok(())
    }
}
