use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};
use std::sync::Arc;
use std::time::Duration;

use super::{codec, EventPublisher, PublishError};
use crate::config::KafkaConfig;
use crate::domain::order::OrderCreatedEvent;
use crate::health::{ComponentHealth, HealthCheckable, HealthStatus};
use crate::metrics::Metrics;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};

/// Kafka-protocol publisher for `order_created`. The producer is created
/// once and shared; every publish goes through the circuit breaker.
pub struct RedpandaPublisher {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
    circuit_breaker: CircuitBreaker,
    metrics: Arc<Metrics>,
}

impl RedpandaPublisher {
    pub fn new(config: &KafkaConfig, metrics: Arc<Metrics>) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.bootstrap_servers())
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", config.message_timeout.as_millis().to_string())
            .create()
            .map_err(|e| PublishError::Unavailable(format!("Failed to create producer: {e}")))?;

        tracing::info!(
            brokers = %config.bootstrap_servers(),
            client_id = %config.client_id,
            topic = %config.topic,
            "Redpanda producer created"
        );

        let circuit_breaker = CircuitBreaker::new("redpanda_publish", CircuitBreakerConfig::default())
            .with_metrics(metrics.clone());

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            send_timeout: config.message_timeout,
            circuit_breaker,
            metrics,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state().await
    }
}

#[async_trait]
impl EventPublisher for RedpandaPublisher {
    async fn publish_order_created(&self, event: &OrderCreatedEvent) -> Result<(), PublishError> {
        let payload = codec::encode_event(event)?;
        let key = event.correlation_id();

        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(&self.topic).key(key).payload(&payload);

                self.producer
                    .send(record, Timeout::After(self.send_timeout))
                    .await
                    .map(|_| ())
                    .map_err(|(e, _)| e)
            })
            .await;

        match result {
            Ok(()) => {
                self.metrics.record_publish(true);
                tracing::info!(
                    topic = %self.topic,
                    correlation_id = %key,
                    "Published OrderCreated event"
                );
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                self.metrics.record_publish(false);
                tracing::error!(
                    topic = %self.topic,
                    correlation_id = %key,
                    "Circuit breaker open - broker unavailable"
                );
                Err(PublishError::CircuitOpen)
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                self.metrics.record_publish(false);
                tracing::error!(
                    error = %e,
                    topic = %self.topic,
                    correlation_id = %key,
                    "Failed to publish OrderCreated event"
                );
                Err(PublishError::Unavailable(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl HealthCheckable for RedpandaPublisher {
    async fn check_health(&self) -> ComponentHealth {
        let state = self.circuit_state().await;
        let status = match state {
            CircuitState::Closed => HealthStatus::Healthy,
            CircuitState::HalfOpen => HealthStatus::Degraded("circuit half-open".to_string()),
            CircuitState::Open => HealthStatus::Degraded("circuit open, publishes fail fast".to_string()),
        };
        ComponentHealth::new(self.component_name(), status)
            .with_details(format!("topic={} circuit={}", self.topic, state.as_str()))
    }

    fn component_name(&self) -> &str {
        "redpanda_publisher"
    }
}
