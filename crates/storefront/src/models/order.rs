//! Placed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mystery_sack_core::{OrderId, OrderStatus, PhoneNumber, Price, ProductId, UserId};

use super::fulfillment::{DeliveryMethod, PaymentMethod};
use super::product::VariationSelections;

/// A line of a placed order, frozen at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub selected_variations: VariationSelections,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// An order submitted through checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    /// Sum of line totals at placement.
    pub total: Price,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub recipient_name: String,
    pub phone_number: PhoneNumber,
    pub address: String,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count: u32, line| count.saturating_add(line.quantity))
    }
}
