use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// Components (publisher, repository, consumer) report their own health;
// HealthMonitor aggregates them for the /health endpoint.
//
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, HealthStatus::Degraded(_))
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }
}

/// Health information for a component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Implemented by anything that can report its own health.
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn check_health(&self) -> ComponentHealth;

    fn component_name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub service: String,
    pub overall_status: HealthStatus,
    pub components: Vec<ComponentHealth>,
    pub check_time: DateTime<Utc>,
}

/// Aggregates component health. Any unhealthy component makes the service
/// unhealthy; otherwise any degraded one makes it degraded.
pub struct HealthMonitor {
    service: String,
    components: Vec<Arc<dyn HealthCheckable>>,
}

impl HealthMonitor {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            components: Vec::new(),
        }
    }

    pub fn with_component(mut self, component: Arc<dyn HealthCheckable>) -> Self {
        self.components.push(component);
        self
    }

    pub async fn system_health(&self) -> SystemHealth {
        let mut components = Vec::with_capacity(self.components.len());
        for component in &self.components {
            let health = component.check_health().await;
            if !health.status.is_healthy() {
                tracing::warn!(
                    component = component.component_name(),
                    status = ?health.status,
                    "Component reporting degraded health"
                );
            }
            components.push(health);
        }

        SystemHealth {
            service: self.service.clone(),
            overall_status: overall_status(&components),
            components,
            check_time: Utc::now(),
        }
    }
}

fn overall_status(components: &[ComponentHealth]) -> HealthStatus {
    let unhealthy: Vec<&str> = components
        .iter()
        .filter(|c| c.status.is_unhealthy())
        .map(|c| c.name.as_str())
        .collect();
    if !unhealthy.is_empty() {
        return HealthStatus::Unhealthy(format!("unhealthy: {}", unhealthy.join(", ")));
    }

    let degraded: Vec<&str> = components
        .iter()
        .filter(|c| c.status.is_degraded())
        .map(|c| c.name.as_str())
        .collect();
    if !degraded.is_empty() {
        return HealthStatus::Degraded(format!("degraded: {}", degraded.join(", ")));
    }

    HealthStatus::Healthy
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, HealthStatus);

    #[async_trait]
    impl HealthCheckable for Fixed {
        async fn check_health(&self) -> ComponentHealth {
            ComponentHealth::new(self.0, self.1.clone())
        }

        fn component_name(&self) -> &str {
            self.0
        }
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let monitor = HealthMonitor::new("order-service")
            .with_component(Arc::new(Fixed("repository", HealthStatus::Healthy)))
            .with_component(Arc::new(Fixed("consumer", HealthStatus::Healthy)));

        let health = monitor.system_health().await;

        assert_eq!(health.overall_status, HealthStatus::Healthy);
        assert_eq!(health.components.len(), 2);
    }

    #[tokio::test]
    async fn test_worst_status_wins() {
        let monitor = HealthMonitor::new("api-gateway")
            .with_component(Arc::new(Fixed("a", HealthStatus::Degraded("slow".into()))))
            .with_component(Arc::new(Fixed("b", HealthStatus::Unhealthy("down".into()))));

        let health = monitor.system_health().await;
        assert_eq!(health.overall_status, HealthStatus::Unhealthy("unhealthy: b".into()));

        let monitor = HealthMonitor::new("api-gateway")
            .with_component(Arc::new(Fixed("a", HealthStatus::Degraded("slow".into()))));
        assert!(monitor.system_health().await.overall_status.is_degraded());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(HealthStatus::Degraded("circuit open".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "degraded", "reason": "circuit open" }));

        let json = serde_json::to_value(HealthStatus::Healthy).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "healthy" }));
    }
}
