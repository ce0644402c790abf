//! User domain types.
//!
//! These types represent validated domain objects; credentials live only in
//! the user repository and never leave it.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mystery_sack_core::{Email, LoyaltyTier, PhoneNumber, ProductId, UserId, UserRole};

/// A storefront account (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email, unique across accounts.
    pub email: Email,
    /// Contact number, used as the checkout default.
    pub phone_number: PhoneNumber,
    pub role: UserRole,
    /// Display name, used as the checkout recipient default.
    pub name: Option<String>,
    /// Shipping address, used as the checkout address default.
    pub address: Option<String>,
    pub billing_address: Option<String>,
    /// Saved product IDs.
    pub wishlist: BTreeSet<ProductId>,
    /// Loyalty points balance.
    pub points: u32,
    pub tier: LoyaltyTier,
    /// When the account was created.
    pub joined_at: DateTime<Utc>,
}

impl User {
    /// Whether the account may use admin operations.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    #[must_use]
    pub fn has_wishlisted(&self, product_id: ProductId) -> bool {
        self.wishlist.contains(&product_id)
    }

    /// Merge a profile patch into this user. Unset fields are left alone.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(phone_number) = update.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        if let Some(billing_address) = update.billing_address {
            self.billing_address = Some(billing_address);
        }
        if let Some(wishlist) = update.wishlist {
            self.wishlist = wishlist;
        }
    }
}

/// Partial profile update; `None` fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone_number: Option<PhoneNumber>,
    pub address: Option<String>,
    pub billing_address: Option<String>,
    pub wishlist: Option<BTreeSet<ProductId>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
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
            joined_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn test_apply_only_touches_set_fields() {
        let mut u = user();
        u.apply(ProfileUpdate {
            address: Some("123 Mango St".to_string()),
            ..ProfileUpdate::default()
        });
        assert_eq!(u.address.as_deref(), Some("123 Mango St"));
        assert_eq!(u.name.as_deref(), Some("Test User"));
        assert_eq!(u.phone_number.as_str(), "9123456789");
    }

    #[test]
    fn test_roles() {
        let mut u = user();
        assert!(!u.is_admin());
        u.role = UserRole::Admin;
        assert!(u.is_admin());
    }
}
