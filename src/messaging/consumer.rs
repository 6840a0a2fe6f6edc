use async_trait::async_trait;
use futures_util::StreamExt;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
    error::KafkaError,
    Message,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;

use super::codec;
use crate::application::CreateOrderUseCase;
use crate::config::KafkaConfig;
use crate::domain::order::Order;
use crate::error::PipelineError;
use crate::health::{ComponentHealth, HealthCheckable, HealthStatus};
use crate::metrics::Metrics;
use crate::validation::validate_event;

// ============================================================================
// OrderCreated Consumer
// ============================================================================
//
// Failure policy: log-and-drop. Every message ends in exactly one terminal
// outcome, either persisted or dropped with a reason, and its offset is
// committed either way. Nothing is retried or dead-lettered, and no error
// escapes the per-message boundary.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Message had no value, or an empty one.
    EmptyPayload,
    /// Value was not JSON.
    Decode,
    /// JSON did not match the event schema.
    Validation,
    /// Order invariants rejected the event.
    DomainInvariant,
    /// Repository refused or could not be reached.
    Persistence,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::EmptyPayload => "empty_payload",
            DropReason::Decode => "decode",
            DropReason::Validation => "validation",
            DropReason::DomainInvariant => "domain_invariant",
            DropReason::Persistence => "persistence",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    Persisted(Order),
    Dropped(DropReason),
}

impl MessageOutcome {
    pub fn drop_reason(&self) -> Option<DropReason> {
        match self {
            MessageOutcome::Persisted(_) => None,
            MessageOutcome::Dropped(reason) => Some(*reason),
        }
    }
}

/// Turns one raw message into one terminal outcome. Independent of the
/// broker client so it can be driven by any transport.
pub struct OrderCreatedHandler {
    use_case: Arc<CreateOrderUseCase>,
    metrics: Arc<Metrics>,
}

impl OrderCreatedHandler {
    pub fn new(use_case: Arc<CreateOrderUseCase>, metrics: Arc<Metrics>) -> Self {
        Self { use_case, metrics }
    }

    pub async fn handle_message(&self, key: Option<&str>, payload: Option<&[u8]>) -> MessageOutcome {
        let started = Instant::now();
        let outcome = self.process(key, payload).await;

        self.metrics.record_message(
            outcome.drop_reason().as_ref().map(DropReason::as_str),
            started.elapsed().as_secs_f64(),
        );
        outcome
    }

    async fn process(&self, key: Option<&str>, payload: Option<&[u8]>) -> MessageOutcome {
        let key = key.unwrap_or("unknown");

        let payload = match payload {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => {
                tracing::warn!(message_key = %key, "Dropping message with empty value");
                return MessageOutcome::Dropped(DropReason::EmptyPayload);
            }
        };

        let value = match codec::decode_payload(payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(message_key = %key, error = %e, "Dropping undecodable message");
                return MessageOutcome::Dropped(DropReason::Decode);
            }
        };

        let correlation_id = codec::peek_correlation_id(&value).unwrap_or(key).to_string();

        let event = match validate_event(&value) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    issues = ?e.issues,
                    "Dropping OrderCreated event that failed validation"
                );
                return MessageOutcome::Dropped(DropReason::Validation);
            }
        };

        match self.use_case.execute_event(event).await {
            Ok(order) => {
                tracing::info!(
                    correlation_id = %correlation_id,
                    order_id = %order.id(),
                    "Order persisted from OrderCreated event"
                );
                MessageOutcome::Persisted(order)
            }
            Err(e) => {
                let reason = match e {
                    PipelineError::Validation(_) => DropReason::Validation,
                    PipelineError::Decode(_) => DropReason::Decode,
                    PipelineError::Domain(_) => DropReason::DomainInvariant,
                    PipelineError::Unavailable(_) | PipelineError::Conflict(_) => DropReason::Persistence,
                };
                if reason == DropReason::Persistence {
                    tracing::error!(
                        correlation_id = %correlation_id,
                        error = %e,
                        "Failed to persist order, message dropped"
                    );
                } else {
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        error = %e,
                        "Dropping OrderCreated event rejected by create-order"
                    );
                }
                MessageOutcome::Dropped(reason)
            }
        }
    }
}

/// Consumer loop liveness, shared with the health endpoint.
#[derive(Default)]
pub struct ConsumerStatus {
    running: AtomicBool,
    persisted: AtomicU64,
    dropped: AtomicU64,
}

impl ConsumerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn record(&self, outcome: &MessageOutcome) {
        let counter = match outcome {
            MessageOutcome::Persisted(_) => &self.persisted,
            MessageOutcome::Dropped(_) => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn persisted(&self) -> u64 {
        self.persisted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HealthCheckable for ConsumerStatus {
    async fn check_health(&self) -> ComponentHealth {
        let status = if self.is_running() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy("consumer loop not running".to_string())
        };
        ComponentHealth::new(self.component_name(), status).with_details(format!(
            "persisted={} dropped={}",
            self.persisted(),
            self.dropped()
        ))
    }

    fn component_name(&self) -> &str {
        "order_created_consumer"
    }
}

/// Subscribes to the order topic and feeds each message, one at a time,
/// through [`OrderCreatedHandler`].
pub struct OrderEventConsumer {
    consumer: StreamConsumer,
    topic: String,
    handler: OrderCreatedHandler,
    status: Arc<ConsumerStatus>,
}

impl OrderEventConsumer {
    pub fn new(
        config: &KafkaConfig,
        handler: OrderCreatedHandler,
        status: Arc<ConsumerStatus>,
    ) -> Result<Self, KafkaError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", config.bootstrap_servers())
            .set("group.id", &config.group_id)
            .set("client.id", &config.client_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "latest")
            .set("session.timeout.ms", "6000")
            .set("enable.partition.eof", "false")
            .create()?;

        consumer.subscribe(&[config.topic.as_str()])?;

        tracing::info!(
            topic = %config.topic,
            group_id = %config.group_id,
            manual_commit = true,
            "Subscribed to order topic"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
            handler,
            status,
        })
    }

    /// Consume until `shutdown` fires or the stream ends.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        self.status.set_running(true);
        let mut stream = self.consumer.stream();

        loop {
            let next = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(topic = %self.topic, "Consumer shutdown requested");
                    break;
                }
                next = stream.next() => next,
            };

            let message = match next {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    tracing::warn!(topic = %self.topic, error = %e, "Failed to receive message");
                    continue;
                }
                None => break,
            };

            let key = message.key().and_then(|k| std::str::from_utf8(k).ok());
            let outcome = self.handler.handle_message(key, message.payload()).await;
            self.status.record(&outcome);

            if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async) {
                tracing::warn!(
                    topic = message.topic(),
                    partition = message.partition(),
                    offset = message.offset(),
                    error = %e,
                    "Failed to commit offset (message may be redelivered)"
                );
            }
        }

        self.status.set_running(false);
        tracing::info!(topic = %self.topic, "Consumer loop exited");
    }
}
