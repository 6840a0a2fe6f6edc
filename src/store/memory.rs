use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{OrdersRepository, RepositoryError};
use crate::domain::order::Order;

#[derive(Default)]
struct Inner {
    orders: HashMap<String, Order>,
    insertion_order: Vec<String>,
}

/// Process-local orders store. A single lock guards the map; orders are
/// immutable once inserted so no finer-grained locking is needed.
#[derive(Default)]
pub struct InMemoryOrdersRepository {
    inner: RwLock<Inner>,
}

impl InMemoryOrdersRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrdersRepository for InMemoryOrdersRepository {
    async fn create(&self, order: Order) -> Result<Order, RepositoryError> {
        let mut inner = self.inner.write().await;

        if inner.orders.contains_key(order.id()) {
            return Err(RepositoryError::DuplicateId(order.id().to_string()));
        }

        tracing::debug!(
            order_id = %order.id(),
            created_at = %order.created_at(),
            "Storing order in memory"
        );

        inner.insertion_order.push(order.id().to_string());
        inner.orders.insert(order.id().to_string(), order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError> {
        Ok(self.inner.read().await.orders.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .insertion_order
            .iter()
            .filter_map(|id| inner.orders.get(id).cloned())
            .collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
