use async_trait::async_trait;

use crate::domain::order::OrderCreatedEvent;

// ============================================================================
// Messaging
// ============================================================================
//
// - codec:    OrderCreatedEvent <-> UTF-8 JSON bytes
// - redpanda: Kafka-protocol publisher (rdkafka FutureProducer)
// - consumer: per-message handler and the StreamConsumer loop
//
// Message key is the correlation id. Delivery is at-least-once; nothing
// here deduplicates.
//
// ============================================================================

pub mod codec;
pub mod consumer;
pub mod redpanda;

pub use consumer::{ConsumerStatus, DropReason, MessageOutcome, OrderCreatedHandler, OrderEventConsumer};
pub use redpanda::RedpandaPublisher;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Broker unavailable: {0}")]
    Unavailable(String),

    #[error("Circuit breaker open for broker")]
    CircuitOpen,
}

/// Outbound port for the gateway. One attempt per call.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_order_created(&self, event: &OrderCreatedEvent) -> Result<(), PublishError>;
}
