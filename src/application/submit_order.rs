use chrono::Utc;
use std::sync::Arc;

use crate::domain::order::{OrderCreatedEvent, OrderRequest};
use crate::error::PipelineError;
use crate::messaging::EventPublisher;
use crate::metrics::Metrics;

/// Gateway side of the pipeline. Works on the wire-shaped request only and
/// never builds an `Order`; invariants are enforced by the consumer.
pub struct SubmitOrderUseCase {
    publisher: Arc<dyn EventPublisher>,
    metrics: Arc<Metrics>,
}

impl SubmitOrderUseCase {
    pub fn new(publisher: Arc<dyn EventPublisher>, metrics: Arc<Metrics>) -> Self {
        Self { publisher, metrics }
    }

    /// Stamp the request with `correlation_id` and the current time, publish
    /// it, and return the published event as the acknowledgment.
    pub async fn execute(
        &self,
        request: OrderRequest,
        correlation_id: &str,
    ) -> Result<OrderCreatedEvent, PipelineError> {
        let event = OrderCreatedEvent::from_request(request, correlation_id, Utc::now());

        match self.publisher.publish_order_created(&event).await {
            Ok(()) => {
                self.metrics.record_submission("accepted");
                tracing::info!(
                    correlation_id = %correlation_id,
                    customer_id = %event.customer_id,
                    items = event.items.len(),
                    "Order accepted and published"
                );
                Ok(event)
            }
            Err(e) => {
                self.metrics.record_submission("unavailable");
                tracing::error!(
                    correlation_id = %correlation_id,
                    error = %e,
                    "Order could not be published"
                );
                Err(e.into())
            }
        }
    }
}
