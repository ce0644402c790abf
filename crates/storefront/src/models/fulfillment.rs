//! Delivery and payment options offered at checkout.
//!
//! Both sets are closed: adding an option means adding a variant, and every
//! `match` over them must be updated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the order reaches the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    #[default]
    StorePickup,
    CashOnDelivery,
    Meetup,
}

const COD_LOCATIONS: &[&str] = &[
    "Paliparan",
    "Salitran",
    "San Agustin",
    "Sampaloc",
    "Zone 1-4",
];

impl DeliveryMethod {
    /// All methods in display order.
    pub const ALL: [Self; 3] = [Self::StorePickup, Self::CashOnDelivery, Self::Meetup];

    /// Stable identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::StorePickup => "pickup",
            Self::CashOnDelivery => "cod",
            Self::Meetup => "meetup",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StorePickup => "Store Pickup",
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Meetup => "Meetup",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::StorePickup => "Pick up your order at our store in Dasmariñas, Cavite",
            Self::CashOnDelivery => "Available in select areas of Dasmariñas, Cavite",
            Self::Meetup => "Meet at designated locations in Dasmariñas, Cavite",
        }
    }

    /// Areas the method is limited to; `None` means no restriction.
    #[must_use]
    pub const fn available_locations(self) -> Option<&'static [&'static str]> {
        match self {
            Self::CashOnDelivery => Some(COD_LOCATIONS),
            Self::StorePickup | Self::Meetup => None,
        }
    }

    /// Whether a free-text address falls inside the method's service area.
    ///
    /// Matching is a case-insensitive substring search for any listed
    /// location.
    #[must_use]
    pub fn serves(self, address: &str) -> bool {
        self.available_locations().is_none_or(|locations| {
            let address = address.to_lowercase();
            locations
                .iter()
                .any(|location| address.contains(&location.to_lowercase()))
        })
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| format!("invalid delivery method: {s}"))
    }
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    GCash,
    PayMaya,
    UnionBank,
}

impl PaymentMethod {
    /// All methods in display order.
    pub const ALL: [Self; 3] = [Self::GCash, Self::PayMaya, Self::UnionBank];

    /// Stable identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::GCash => "gcash",
            Self::PayMaya => "paymaya",
            Self::UnionBank => "unionbank",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GCash => "GCash",
            Self::PayMaya => "PayMaya",
            Self::UnionBank => "UnionBank",
        }
    }

    /// Icon path served by the static asset host.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::GCash => "/images/Gcash.png",
            Self::PayMaya => "/images/maya.jpg",
            Self::UnionBank => "/images/unionbank.png",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| format!("invalid payment method: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_first_options() {
        assert_eq!(DeliveryMethod::default(), DeliveryMethod::ALL[0]);
        assert_eq!(PaymentMethod::default(), PaymentMethod::ALL[0]);
    }

    #[test]
    fn test_cod_service_area() {
        assert!(DeliveryMethod::CashOnDelivery.serves("Blk 3 Lot 5, salitran III"));
        assert!(!DeliveryMethod::CashOnDelivery.serves("123 Mango St, Quezon City"));
        assert!(DeliveryMethod::StorePickup.serves("anywhere"));
        assert!(DeliveryMethod::Meetup.available_locations().is_none());
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(
            "cod".parse::<DeliveryMethod>(),
            Ok(DeliveryMethod::CashOnDelivery)
        );
        assert_eq!("paymaya".parse::<PaymentMethod>(), Ok(PaymentMethod::PayMaya));
        assert!("courier".parse::<DeliveryMethod>().is_err());
        assert!("card".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DeliveryMethod::CashOnDelivery).unwrap_or_default();
        assert_eq!(json, "\"cash_on_delivery\"");
        let json = serde_json::to_string(&PaymentMethod::GCash).unwrap_or_default();
        assert_eq!(json, "\"gcash\"");
    }
}
