use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tokio::sync::oneshot;

use order_pipeline::application::CreateOrderUseCase;
use order_pipeline::config::{Config, ServiceKind};
use order_pipeline::health::HealthMonitor;
use order_pipeline::messaging::{ConsumerStatus, OrderCreatedHandler, OrderEventConsumer};
use order_pipeline::metrics::{self, Metrics};
use order_pipeline::store::{self, RepositoryHealth};
use order_pipeline::{http, telemetry};

/// order-service: consumes `order_created`, persists orders, and serves the
/// internal orders API alongside /metrics and /health.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env(ServiceKind::OrderService)?;
    tracing::info!(
        port = config.server.port,
        topic = %config.kafka.topic,
        group_id = %config.kafka.group_id,
        "🚀 Starting order-service"
    );

    // === 1. Metrics ===
    let metrics = Arc::new(Metrics::new()?);

    // === 2. Repository ===
    let repository = store::connect(&config.database).await?;
    tracing::info!(backend = repository.backend_name(), "Orders repository ready");

    let use_case = Arc::new(CreateOrderUseCase::new(repository.clone(), metrics.clone()));

    // === 3. Consumer loop ===
    let status = Arc::new(ConsumerStatus::new());
    let handler = OrderCreatedHandler::new(use_case.clone(), metrics.clone());
    let consumer = OrderEventConsumer::new(&config.kafka, handler, status.clone())?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let consumer_task = tokio::spawn(consumer.run(shutdown_rx));

    // === 4. HTTP ===
    let monitor = Arc::new(
        HealthMonitor::new(ServiceKind::OrderService.name())
            .with_component(Arc::new(RepositoryHealth::new(repository)))
            .with_component(status),
    );

    tracing::info!(
        "Listening on http://{}:{} (internal orders, /metrics, /health)",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(use_case.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(monitor.clone()))
            .configure(http::internal::configure)
            .configure(metrics::configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    // HTTP server stopped (signal); stop the consumer too.
    let _ = shutdown_tx.send(());
    if let Err(e) = consumer_task.await {
        tracing::error!(error = %e, "Consumer task panicked");
    }

    tracing::info!("order-service stopped");
    Ok(())
}
