use serde_json::Value;

use super::PublishError;
use crate::domain::order::OrderCreatedEvent;
use crate::error::PipelineError;

/// Serialize an event for the wire. Field order is the struct's declaration
/// order, so equal events always produce identical bytes.
pub fn encode_event(event: &OrderCreatedEvent) -> Result<Vec<u8>, PublishError> {
    Ok(serde_json::to_vec(event)?)
}

/// Parse a message value into untyped JSON. Structural checks happen later,
/// in validation; this only rejects bytes that are not JSON at all.
pub fn decode_payload(payload: &[u8]) -> Result<Value, PipelineError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Best-effort correlation id from a raw payload, for logging drops.
pub fn peek_correlation_id(payload: &Value) -> Option<&str> {
    payload.get("correlationId").and_then(Value::as_str)
}
