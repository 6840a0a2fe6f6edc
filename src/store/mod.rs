use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{DatabaseConfig, StorageBackend};
use crate::domain::order::Order;
use crate::health::{ComponentHealth, HealthCheckable, HealthStatus};

// ============================================================================
// Orders Repository
// ============================================================================
//
// Two interchangeable backends behind one contract:
// - memory::InMemoryOrdersRepository - process-local keyed store
// - postgres::PgOrdersRepository     - durable relational store
//
// Duplicate ids are rejected by both backends. Orders are never updated.
//
// ============================================================================

mod memory;
mod postgres;

pub use memory::InMemoryOrdersRepository;
pub use postgres::PgOrdersRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Order {0} already exists")]
    DuplicateId(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored order {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
}

#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Persist a new order and return it as stored.
    async fn create(&self, order: Order) -> Result<Order, RepositoryError>;

    /// `Ok(None)` when no order has that id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError>;

    /// Durable backend: newest first. In-memory backend: insertion order.
    async fn list(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Connectivity check for the health endpoint.
    async fn ping(&self) -> Result<(), RepositoryError>;

    fn backend_name(&self) -> &'static str;
}

/// Build the repository selected by configuration.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn OrdersRepository>> {
    match config.backend() {
        StorageBackend::InMemory => {
            tracing::info!("Using in-memory orders repository");
            Ok(Arc::new(InMemoryOrdersRepository::new()))
        }
        StorageBackend::Postgres(url) => {
            tracing::info!(
                max_connections = config.max_connections,
                "Connecting to PostgreSQL orders repository"
            );
            let repository = PgOrdersRepository::connect(url, config.max_connections).await?;
            repository.ensure_schema().await?;
            Ok(Arc::new(repository))
        }
    }
}

/// Health adapter over whichever backend is in use.
pub struct RepositoryHealth {
    repository: Arc<dyn OrdersRepository>,
}

impl RepositoryHealth {
    pub fn new(repository: Arc<dyn OrdersRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl HealthCheckable for RepositoryHealth {
    async fn check_health(&self) -> ComponentHealth {
        let status = match self.repository.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        };
        ComponentHealth::new(self.component_name(), status)
            .with_details(format!("backend={}", self.repository.backend_name()))
    }

    fn component_name(&self) -> &str {
        "orders_repository"
    }
}
