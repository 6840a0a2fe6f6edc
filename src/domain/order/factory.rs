use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregate::Order;
use super::commands::{LineItem, OrderRequest};
use super::errors::OrderError;
use super::events::OrderCreatedEvent;
use super::value_objects::{Money, OrderItem, OrderStatus};

// ============================================================================
// Order Factory - conversions between the three order representations
// ============================================================================
//
//   OrderRequest ──from_request──┐
//   OrderCreatedEvent ─from_event┼──► Order ──to_storage_row──► OrderRecord
//   OrderRecord ─from_storage_row┘
//
// All functions are pure and route through Order::create.
//
// ============================================================================

/// Flat storage shape of an order. `items` is the JSON-encoded item list.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: String,
    pub customer_id: String,
    pub items: String,
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct StoredItem {
    sku: String,
    quantity: i64,
}

/// Fresh order identifier.
pub fn new_order_id() -> String {
    Uuid::new_v4().to_string()
}

fn build_items(items: &[LineItem]) -> Result<Vec<OrderItem>, OrderError> {
    items
        .iter()
        .map(|item| OrderItem::create(item.sku.clone(), item.quantity))
        .collect()
}

pub fn from_request(id: impl Into<String>, request: &OrderRequest) -> Result<Order, OrderError> {
    let items = build_items(&request.items)?;
    let total = Money::create(request.total_amount)?;
    Order::create(id, request.customer_id.clone(), items, total, None, None)
}

/// Events never carry an order id, so the caller always supplies a fresh one.
/// The event's `createdAt` becomes the order timestamp when it parses.
pub fn from_event(id: impl Into<String>, event: &OrderCreatedEvent) -> Result<Order, OrderError> {
    let items = build_items(&event.items)?;
    let total = Money::create(event.total_amount)?;
    Order::create(
        id,
        event.customer_id.clone(),
        items,
        total,
        Some(OrderStatus::Pending),
        event.created_at_timestamp(),
    )
}

pub fn from_storage_row(record: OrderRecord) -> Result<Order, OrderError> {
    let items = decode_items(&record.items)?;
    let total = Money::create(record.total_amount)?;
    let status = record.status.parse::<OrderStatus>()?;
    Order::create(
        record.id,
        record.customer_id,
        items,
        total,
        Some(status),
        Some(record.created_at),
    )
}

pub fn to_storage_row(order: &Order) -> Result<OrderRecord, OrderError> {
    Ok(OrderRecord {
        id: order.id().to_string(),
        customer_id: order.customer_id().to_string(),
        items: encode_items(order.items())?,
        total_amount: order.total_amount().amount(),
        status: order.status().as_str().to_string(),
        created_at: order.created_at(),
    })
}

/// Encode items as a JSON array of `{sku, quantity}` objects, order preserved.
pub fn encode_items(items: &[OrderItem]) -> Result<String, OrderError> {
    let stored: Vec<StoredItem> = items
        .iter()
        .map(|item| StoredItem {
            sku: item.sku().to_string(),
            quantity: i64::from(item.quantity()),
        })
        .collect();

    serde_json::to_string(&stored).map_err(|e| OrderError::CorruptItems(e.to_string()))
}

pub fn decode_items(encoded: &str) -> Result<Vec<OrderItem>, OrderError> {
    let stored: Vec<StoredItem> =
        serde_json::from_str(encoded).map_err(|e| OrderError::CorruptItems(e.to_string()))?;

    stored
        .into_iter()
        .map(|item| OrderItem::create(item.sku, item.quantity))
        .collect()
}
