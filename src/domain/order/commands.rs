use serde::{Deserialize, Serialize};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================
//
// Wire-shaped input, before any domain invariant has been enforced.
// Validation (crate::validation) produces these from raw JSON.
//
// ============================================================================

/// Line item as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(sku: impl Into<String>, quantity: i64) -> Self {
        Self {
            sku: sku.into(),
            quantity,
        }
    }
}

/// Body of `POST /orders` and `POST /internal/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_id: String,
    pub items: Vec<LineItem>,
    pub total_amount: f64,
}
