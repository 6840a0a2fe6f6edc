use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::commands::{LineItem, OrderRequest};

// ============================================================================
// Order Events - what travels over the order_created topic
// ============================================================================

/// Default topic name for order creation events.
pub const ORDER_CREATED_TOPIC: &str = "order_created";

/// Producer-side intent to create an order, plus tracing metadata.
///
/// This is a flattened copy of the submitted request, not an [`Order`]:
/// it carries no order id and has not been through invariant checks.
/// Field order is fixed by declaration order, so serialization is
/// deterministic: `customerId, items, totalAmount, correlationId, createdAt`.
///
/// `correlation_id` and `created_at` are always set by the gateway. They
/// are optional here because the consumer accepts envelopes without them.
///
/// [`Order`]: super::Order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedEvent {
    pub customer_id: String,
    pub items: Vec<LineItem>,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl OrderCreatedEvent {
    /// Enrich a validated request with its correlation id and a publish
    /// timestamp.
    pub fn from_request(
        request: OrderRequest,
        correlation_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_id: request.customer_id,
            items: request.items,
            total_amount: request.total_amount,
            correlation_id: Some(correlation_id.into()),
            created_at: Some(created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    pub fn correlation_id(&self) -> &str {
        self.correlation_id.as_deref().unwrap_or("unknown")
    }

    /// Publish timestamp, when present and well formed.
    pub fn created_at_timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}
