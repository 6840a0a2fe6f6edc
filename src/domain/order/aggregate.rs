use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::OrderError;
use super::value_objects::{Money, OrderItem, OrderStatus};

// ============================================================================
// Order Entity
// ============================================================================
//
// Fields are private and `Order::create` is the only constructor, so every
// Order in the process has passed the invariant checks below. Orders are
// never mutated after creation.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: String,
    customer_id: String,
    items: Vec<OrderItem>,
    total_amount: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Build an order, checking identity and item invariants.
    ///
    /// `status` defaults to `Pending` and `created_at` to the current time.
    pub fn create(
        id: impl Into<String>,
        customer_id: impl Into<String>,
        items: Vec<OrderItem>,
        total_amount: Money,
        status: Option<OrderStatus>,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, OrderError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(OrderError::MissingId);
        }

        let customer_id = customer_id.into();
        if customer_id.trim().is_empty() {
            return Err(OrderError::MissingCustomerId);
        }

        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        Ok(Self {
            id,
            customer_id,
            items,
            total_amount,
            status: status.unwrap_or_default(),
            created_at: created_at.unwrap_or_else(Utc::now),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
