use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Positive, finite monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Money(f64);

impl Money {
    pub fn create(amount: f64) -> Result<Self, OrderError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(OrderError::InvalidAmount(amount));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Money {
    type Error = OrderError;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Self::create(amount)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

/// A single order line: a SKU and how many units of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    sku: String,
    quantity: u32,
}

impl OrderItem {
    pub fn create(sku: impl Into<String>, quantity: i64) -> Result<Self, OrderError> {
        let sku = sku.into();
        if sku.trim().is_empty() {
            return Err(OrderError::InvalidSku);
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or(OrderError::InvalidQuantity(quantity))?;

        Ok(Self { sku, quantity })
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Canceled,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "canceled" => Ok(OrderStatus::Canceled),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(OrderError::InvalidStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
