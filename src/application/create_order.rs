use std::sync::Arc;

use crate::domain::order::factory::{from_event, from_request, new_order_id};
use crate::domain::order::{Order, OrderCreatedEvent, OrderRequest};
use crate::error::PipelineError;
use crate::metrics::Metrics;
use crate::store::OrdersRepository;
use crate::validation::Validate;

/// Order-service side of the pipeline: re-validate, build, persist.
///
/// Input has already passed structural validation at the edge; it is checked
/// again here because the producer is not trusted.
pub struct CreateOrderUseCase {
    repository: Arc<dyn OrdersRepository>,
    metrics: Arc<Metrics>,
}

impl CreateOrderUseCase {
    pub fn new(repository: Arc<dyn OrdersRepository>, metrics: Arc<Metrics>) -> Self {
        Self { repository, metrics }
    }

    pub fn repository(&self) -> &Arc<dyn OrdersRepository> {
        &self.repository
    }

    /// Synchronous path (`POST /internal/orders`).
    pub async fn execute(&self, request: OrderRequest) -> Result<Order, PipelineError> {
        request.validate()?;
        let order = from_request(new_order_id(), &request)?;
        self.persist(order, "http").await
    }

    /// Event path. Events carry no order id, so a fresh one is always
    /// assigned.
    pub async fn execute_event(&self, event: OrderCreatedEvent) -> Result<Order, PipelineError> {
        event.validate()?;
        let order = from_event(new_order_id(), &event)?;
        tracing::debug!(
            correlation_id = %event.correlation_id(),
            order_id = %order.id(),
            "Built order from event"
        );
        self.persist(order, "event").await
    }

    async fn persist(&self, order: Order, source: &'static str) -> Result<Order, PipelineError> {
        let stored = self.repository.create(order).await?;
        self.metrics
            .record_order_created(source, self.repository.backend_name());
        tracing::info!(
            order_id = %stored.id(),
            customer_id = %stored.customer_id(),
            total_amount = stored.total_amount().amount(),
            source,
            "Order created"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{LineItem, OrderStatus};
    use crate::store::{InMemoryOrdersRepository, RepositoryError};
    use async_trait::async_trait;

    const CUSTOMER: &str = "5b1f9d3e-4b8a-4c1e-9d7f-2a6b8c0e1f23";

    fn use_case() -> CreateOrderUseCase {
        CreateOrderUseCase::new(
            Arc::new(InMemoryOrdersRepository::new()),
            Arc::new(Metrics::new().unwrap()),
        )
    }

    fn request() -> OrderRequest {
        OrderRequest {
            customer_id: CUSTOMER.to_string(),
            items: vec![LineItem::new("SKU-1", 2), LineItem::new("SKU-2", 1)],
            total_amount: 75.25,
        }
    }

    #[tokio::test]
    async fn test_execute_persists_pending_order() {
        let use_case = use_case();

        let order = use_case.execute(request()).await.unwrap();

        assert_eq!(order.customer_id(), CUSTOMER);
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.total_amount().amount(), 75.25);
        assert_eq!(order.status(), OrderStatus::Pending);
        let found = use_case.repository().find_by_id(order.id()).await.unwrap();
        assert_eq!(found, Some(order));
    }

    #[tokio::test]
    async fn test_each_execution_assigns_a_fresh_id() {
        let use_case = use_case();

        let first = use_case.execute(request()).await.unwrap();
        let second = use_case.execute(request()).await.unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(use_case.repository().list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_revalidation_rejects_before_persisting() {
        let use_case = use_case();
        let mut request = request();
        request.customer_id = "c1".to_string();

        let result = use_case.execute(request).await;

        assert!(matches!(result, Err(PipelineError::Validation(_))));
        assert!(use_case.repository().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_with_empty_items_is_rejected() {
        let use_case = use_case();
        let event = OrderCreatedEvent {
            customer_id: CUSTOMER.to_string(),
            items: vec![],
            total_amount: 10.0,
            correlation_id: Some("corr-1".to_string()),
            created_at: None,
        };

        assert!(use_case.execute_event(event).await.is_err());
        assert!(use_case.repository().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_timestamp_becomes_order_timestamp() {
        let use_case = use_case();
        let event = OrderCreatedEvent {
            customer_id: CUSTOMER.to_string(),
            items: vec![LineItem::new("SKU-1", 1)],
            total_amount: 10.0,
            correlation_id: Some("corr-1".to_string()),
            created_at: Some("2024-03-04T05:06:07.000Z".to_string()),
        };

        let order = use_case.execute_event(event).await.unwrap();

        assert_eq!(order.created_at().to_rfc3339(), "2024-03-04T05:06:07+00:00");
    }

    struct DownRepository;

    #[async_trait]
    impl OrdersRepository for DownRepository {
        async fn create(&self, _order: Order) -> Result<Order, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<Order>, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }

        async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "down"
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_unavailable() {
        let use_case = CreateOrderUseCase::new(Arc::new(DownRepository), Arc::new(Metrics::new().unwrap()));

        let result = use_case.execute(request()).await;

        assert!(matches!(result, Err(PipelineError::Unavailable(_))));
    }
}
