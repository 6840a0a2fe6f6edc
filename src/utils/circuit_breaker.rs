use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::metrics::Metrics;

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Guards the broker publish path. After repeated failures the circuit opens
// and publishes fail immediately instead of waiting out the send timeout.
// There is no retry here; a rejected call is reported to the caller as-is.
//
// States:
// - Closed: calls pass through
// - Open: calls rejected until the open timeout elapses
// - HalfOpen: calls pass through; enough successes close the circuit,
//   a single failure reopens it
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }

    /// Value exported on the circuit state gauge.
    pub fn gauge_value(&self) -> i64 {
        match self {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// How long the circuit stays open before letting a call through
    pub open_timeout: Duration,
    /// Successes in half-open needed to close the circuit
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(30),
            success_threshold: 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    #[error("Circuit breaker is open")]
    CircuitOpen,

    #[error("{0}")]
    OperationFailed(E),
}

struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    opened_at: Option<Instant>,
}

#[derive(Clone)]
pub struct CircuitBreaker {
    name: &'static str,
    state: Arc<Mutex<BreakerState>>,
    config: CircuitBreakerConfig,
    metrics: Option<Arc<Metrics>>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            state: Arc::new(Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                opened_at: None,
            })),
            config,
            metrics: None,
        }
    }

    /// Report state changes on the circuit gauge and transition counter.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        metrics.set_circuit_state(CircuitState::Closed);
        self.metrics = Some(metrics);
        self
    }

    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        {
            let mut guard = self.state.lock().await;
            if guard.state == CircuitState::Open {
                let elapsed = guard
                    .opened_at
                    .map(|at| at.elapsed() >= self.config.open_timeout)
                    .unwrap_or(true);
                if !elapsed {
                    return Err(CircuitBreakerError::CircuitOpen);
                }
                guard.success_count = 0;
                self.transition(&mut guard, CircuitState::HalfOpen);
            }
        }

        match operation.await {
            Ok(value) => {
                self.record_success().await;
                Ok(value)
            }
            Err(err) => {
                self.record_failure().await;
                Err(CircuitBreakerError::OperationFailed(err))
            }
        }
    }

    async fn record_success(&self) {
        let mut guard = self.state.lock().await;
        match guard.state {
            CircuitState::HalfOpen => {
                guard.success_count += 1;
                if guard.success_count >= self.config.success_threshold {
                    guard.failure_count = 0;
                    guard.success_count = 0;
                    guard.opened_at = None;
                    self.transition(&mut guard, CircuitState::Closed);
                }
            }
            CircuitState::Closed => guard.failure_count = 0,
            // A call admitted before another caller opened the circuit.
            CircuitState::Open => {}
        }
    }

    async fn record_failure(&self) {
        let mut guard = self.state.lock().await;
        guard.failure_count += 1;

        match guard.state {
            CircuitState::Closed if guard.failure_count >= self.config.failure_threshold => {
                guard.opened_at = Some(Instant::now());
                self.transition(&mut guard, CircuitState::Open);
            }
            CircuitState::HalfOpen => {
                guard.success_count = 0;
                guard.opened_at = Some(Instant::now());
                self.transition(&mut guard, CircuitState::Open);
            }
            _ => {}
        }
    }

    fn transition(&self, guard: &mut BreakerState, to: CircuitState) {
        let from = guard.state;
        guard.state = to;

        match to {
            CircuitState::Open => tracing::warn!(
                breaker = self.name,
                failures = guard.failure_count,
                from = from.as_str(),
                "Circuit breaker opened"
            ),
            _ => tracing::info!(
                breaker = self.name,
                from = from.as_str(),
                to = to.as_str(),
                "Circuit breaker state changed"
            ),
        }

        if let Some(metrics) = &self.metrics {
            metrics.set_circuit_state(to);
            metrics.record_circuit_transition(from, to);
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.state.lock().await.state
    }

    #[cfg(test)]
    async fn failure_count(&self) -> u32 {
        self.state.lock().await.failure_count
    }

    #[cfg(test)]
    async fn reset(&self) {
        let mut guard = self.state.lock().await;
        guard.failure_count = 0;
        guard.success_count = 0;
        guard.opened_at = None;
        if guard.state != CircuitState::Closed {
            self.transition(&mut guard, CircuitState::Closed);
        }
    }
}
