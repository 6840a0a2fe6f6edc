#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use order_pipeline::application::{CreateOrderUseCase, SubmitOrderUseCase};
use order_pipeline::domain::order::OrderCreatedEvent;
use order_pipeline::messaging::codec::encode_event;
use order_pipeline::messaging::{EventPublisher, MessageOutcome, OrderCreatedHandler, PublishError};
use order_pipeline::metrics::Metrics;
use order_pipeline::store::{InMemoryOrdersRepository, OrdersRepository};

pub const CUSTOMER_A: &str = "5b1f9d3e-4b8a-4c1e-9d7f-2a6b8c0e1f23";
pub const CUSTOMER_B: &str = "0c6a2f4e-9d1b-4e7a-8f3c-6b5d4a3e2f10";

/// A broker record: key and value, as they would sit on the topic.
pub type Record = (String, Vec<u8>);

/// In-process stand-in for the topic. Publishing encodes the event exactly
/// like the Kafka publisher and pushes the record onto a channel.
pub struct ChannelBroker {
    tx: mpsc::UnboundedSender<Record>,
}

impl ChannelBroker {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Record>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl EventPublisher for ChannelBroker {
    async fn publish_order_created(&self, event: &OrderCreatedEvent) -> Result<(), PublishError> {
        let payload = encode_event(event)?;
        self.tx
            .send((event.correlation_id().to_string(), payload))
            .map_err(|_| PublishError::Unavailable("channel closed".to_string()))
    }
}

/// Publisher whose broker is always down.
pub struct DownPublisher;

#[async_trait]
impl EventPublisher for DownPublisher {
    async fn publish_order_created(&self, _event: &OrderCreatedEvent) -> Result<(), PublishError> {
        Err(PublishError::Unavailable("all brokers down".to_string()))
    }
}

/// Keeps published events in memory, for inspecting the gateway.
#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<OrderCreatedEvent>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish_order_created(&self, event: &OrderCreatedEvent) -> Result<(), PublishError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

/// Both halves of the pipeline wired over a [`ChannelBroker`].
pub struct Pipeline {
    pub submit: Arc<SubmitOrderUseCase>,
    pub create: Arc<CreateOrderUseCase>,
    pub handler: OrderCreatedHandler,
    pub repository: Arc<dyn OrdersRepository>,
    pub metrics: Arc<Metrics>,
    pub topic: mpsc::UnboundedReceiver<Record>,
}

impl Pipeline {
    pub fn new() -> Self {
        let metrics = Arc::new(Metrics::new().unwrap());
        let (broker, topic) = ChannelBroker::new();
        let repository: Arc<dyn OrdersRepository> = Arc::new(InMemoryOrdersRepository::new());
        let create = Arc::new(CreateOrderUseCase::new(repository.clone(), metrics.clone()));

        Self {
            submit: Arc::new(SubmitOrderUseCase::new(broker, metrics.clone())),
            handler: OrderCreatedHandler::new(create.clone(), metrics.clone()),
            create,
            repository,
            metrics,
            topic,
        }
    }

    /// Consume every record currently on the topic, one at a time.
    pub async fn drain(&mut self) -> Vec<MessageOutcome> {
        let mut outcomes = Vec::new();
        while let Ok((key, payload)) = self.topic.try_recv() {
            outcomes.push(self.handler.handle_message(Some(key.as_str()), Some(payload.as_slice())).await);
        }
        outcomes
    }
}
