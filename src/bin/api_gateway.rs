use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use order_pipeline::application::SubmitOrderUseCase;
use order_pipeline::config::{Config, ServiceKind};
use order_pipeline::health::HealthMonitor;
use order_pipeline::messaging::RedpandaPublisher;
use order_pipeline::metrics::{self, Metrics};
use order_pipeline::{http, telemetry};

/// api-gateway: accepts `POST /orders` and publishes `order_created`.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env(ServiceKind::ApiGateway)?;
    tracing::info!(
        port = config.server.port,
        brokers = %config.kafka.bootstrap_servers(),
        topic = %config.kafka.topic,
        "🚀 Starting api-gateway"
    );

    let metrics = Arc::new(Metrics::new()?);

    // Producer is created once here and shared by every request.
    let publisher = Arc::new(RedpandaPublisher::new(&config.kafka, metrics.clone())?);
    let use_case = Arc::new(SubmitOrderUseCase::new(publisher.clone(), metrics.clone()));

    let monitor = Arc::new(HealthMonitor::new(ServiceKind::ApiGateway.name()).with_component(publisher));

    tracing::info!(
        "Listening on http://{}:{} (POST /orders, /metrics, /health)",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(use_case.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(monitor.clone()))
            .configure(http::gateway::configure)
            .configure(metrics::configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    tracing::info!("api-gateway stopped");
    Ok(())
}
