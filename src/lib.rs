//! Asynchronous order-creation pipeline.
//!
//! The `api-gateway` binary validates `POST /orders`, stamps a correlation id
//! and publishes an `OrderCreatedEvent`. The `order-service` binary consumes
//! those events, enforces the order invariants and persists through an
//! [`store::OrdersRepository`], in memory or in PostgreSQL.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod health;
pub mod http;
pub mod messaging;
pub mod metrics;
pub mod store;
pub mod telemetry;
pub mod utils;
pub mod validation;
