//! Order repository.

use chrono::{DateTime, Utc};

use mystery_sack_core::{OrderId, OrderStatus, PhoneNumber, Price, UserId};

use super::RepositoryError;
use crate::models::{DeliveryMethod, Order, OrderLine, PaymentMethod};

/// Days between placement and the estimated delivery date.
const ESTIMATED_DELIVERY_DAYS: i64 = 3;

/// Fields needed to record a placed order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total: Price,
    pub recipient_name: String,
    pub phone_number: PhoneNumber,
    pub address: String,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
}

/// Order table, oldest first.
#[derive(Debug, Default)]
pub struct OrderRepository {
    rows: Vec<Order>,
}

impl OrderRepository {
    /// Create an empty order repository.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Record a new order in `pending` status.
    pub fn insert(&mut self, new_order: NewOrder, now: DateTime<Utc>) -> Order {
        let next = self.rows.iter().map(|o| o.id.as_i32()).max().unwrap_or(0) + 1;
        let order = Order {
            id: OrderId::new(next),
            user_id: new_order.user_id,
            lines: new_order.lines,
            total: new_order.total,
            status: OrderStatus::Pending,
            tracking_number: None,
            recipient_name: new_order.recipient_name,
            phone_number: new_order.phone_number,
            address: new_order.address,
            delivery_method: new_order.delivery_method,
            payment_method: new_order.payment_method,
            created_at: now,
            updated_at: now,
            estimated_delivery: Some(now + chrono::TimeDelta::days(ESTIMATED_DELIVERY_DAYS)),
        };
        self.rows.push(order.clone());
        order
    }

    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.rows.iter().find(|o| o.id == id)
    }

    /// Mutable access to an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    pub fn get_mut(&mut self, id: OrderId) -> Result<&mut Order, RepositoryError> {
        self.rows
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("order {id}")))
    }

    /// All orders, oldest first.
    #[must_use]
    pub fn list(&self) -> &[Order] {
        &self.rows
    }

    /// Orders placed by one user, newest first.
    #[must_use]
    pub fn list_for_user(&self, user_id: UserId) -> Vec<&Order> {
        self.rows
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
