// ============================================================================
// Order Invariant Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order id is required")]
    MissingId,

    #[error("Customer id is required")]
    MissingCustomerId,

    #[error("Order must have at least one item")]
    EmptyItems,

    #[error("Amount must be greater than zero: {0}")]
    InvalidAmount(f64),

    #[error("SKU must not be empty")]
    InvalidSku,

    #[error("Quantity must be a positive integer: {0}")]
    InvalidQuantity(i64),

    #[error("Unknown order status: {0}")]
    InvalidStatus(String),

    #[error("Stored items could not be decoded: {0}")]
    CorruptItems(String),
}

impl OrderError {
    /// Request field the violation refers to, in the same dotted form
    /// validation issues use.
    pub fn field(&self) -> &'static str {
        match self {
            OrderError::MissingId => "id",
            OrderError::MissingCustomerId => "customerId",
            OrderError::EmptyItems | OrderError::CorruptItems(_) => "items",
            OrderError::InvalidAmount(_) => "totalAmount",
            OrderError::InvalidSku => "items.sku",
            OrderError::InvalidQuantity(_) => "items.quantity",
            OrderError::InvalidStatus(_) => "status",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            OrderError::MissingId => "missing_id",
            OrderError::MissingCustomerId => "missing_customer_id",
            OrderError::EmptyItems => "empty_items",
            OrderError::InvalidAmount(_) => "invalid_amount",
            OrderError::InvalidSku => "invalid_sku",
            OrderError::InvalidQuantity(_) => "invalid_quantity",
            OrderError::InvalidStatus(_) => "invalid_status",
            OrderError::CorruptItems(_) => "corrupt_items",
        }
    }
}
