mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};

use crate::utils::CircuitState;

pub use server::configure;

// ============================================================================
// Metrics - Prometheus counters for the order pipeline
// ============================================================================
//
// Covers:
// - Gateway submissions and their outcome
// - Publishes to the broker
// - Messages consumed, persisted or dropped (by reason)
// - Orders created, by entry point and backend
// - Publisher circuit breaker state
//
// Each process owns one registry, scraped via GET /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Gateway
    pub orders_submitted: IntCounterVec,
    pub events_published: IntCounterVec,

    // Consumer
    pub messages_consumed: IntCounterVec,
    pub messages_dropped: IntCounterVec,
    pub message_processing_duration: HistogramVec,

    // Use case
    pub orders_created: IntCounterVec,

    // Circuit breaker
    pub circuit_breaker_state: IntGauge,
    pub circuit_breaker_transitions: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_submitted = IntCounterVec::new(
            Opts::new("orders_submitted_total", "Order submissions received by the gateway"),
            &["outcome"],
        )?;
        registry.register(Box::new(orders_submitted.clone()))?;

        let events_published = IntCounterVec::new(
            Opts::new("order_events_published_total", "OrderCreated publish attempts"),
            &["result"],
        )?;
        registry.register(Box::new(events_published.clone()))?;

        let messages_consumed = IntCounterVec::new(
            Opts::new("order_messages_consumed_total", "OrderCreated messages consumed"),
            &["outcome"],
        )?;
        registry.register(Box::new(messages_consumed.clone()))?;

        let messages_dropped = IntCounterVec::new(
            Opts::new("order_messages_dropped_total", "Consumed messages that produced no order"),
            &["reason"],
        )?;
        registry.register(Box::new(messages_dropped.clone()))?;

        let message_processing_duration = HistogramVec::new(
            HistogramOpts::new(
                "order_message_processing_duration_seconds",
                "Time from message receipt to terminal outcome",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(message_processing_duration.clone()))?;

        let orders_created = IntCounterVec::new(
            Opts::new("orders_created_total", "Orders persisted by the create-order use case"),
            &["source", "backend"],
        )?;
        registry.register(Box::new(orders_created.clone()))?;

        let circuit_breaker_state = IntGauge::new(
            "circuit_breaker_state",
            "Publisher circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        let circuit_breaker_transitions = IntCounterVec::new(
            Opts::new("circuit_breaker_transitions_total", "Circuit breaker state transitions"),
            &["from_state", "to_state"],
        )?;
        registry.register(Box::new(circuit_breaker_transitions.clone()))?;

        Ok(Self {
            registry,
            orders_submitted,
            events_published,
            messages_consumed,
            messages_dropped,
            message_processing_duration,
            orders_created,
            circuit_breaker_state,
            circuit_breaker_transitions,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// `outcome` is one of accepted, rejected or unavailable.
    pub fn record_submission(&self, outcome: &str) {
        self.orders_submitted.with_label_values(&[outcome]).inc();
    }

    pub fn record_publish(&self, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.events_published.with_label_values(&[result]).inc();
    }

    /// Record a consumed message. `dropped` carries the drop reason label.
    pub fn record_message(&self, dropped: Option<&str>, duration_secs: f64) {
        let outcome = match dropped {
            Some(reason) => {
                self.messages_dropped.with_label_values(&[reason]).inc();
                "dropped"
            }
            None => "persisted",
        };
        self.messages_consumed.with_label_values(&[outcome]).inc();
        self.message_processing_duration
            .with_label_values(&[outcome])
            .observe(duration_secs);
    }

    /// `source` is http or event; `backend` is the repository in use.
    pub fn record_order_created(&self, source: &str, backend: &str) {
        self.orders_created.with_label_values(&[source, backend]).inc();
    }

    pub fn set_circuit_state(&self, state: CircuitState) {
        self.circuit_breaker_state.set(state.gauge_value());
    }

    pub fn record_circuit_transition(&self, from: CircuitState, to: CircuitState) {
        self.circuit_breaker_transitions
            .with_label_values(&[from.as_str(), to.as_str()])
            .inc();
    }
}
