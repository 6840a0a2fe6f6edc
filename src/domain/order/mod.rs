// ============================================================================
// Order Domain
// ============================================================================
//
// - Value objects (Money, OrderItem, OrderStatus)
// - Commands (OrderRequest, LineItem) - wire-shaped intent
// - Events (OrderCreatedEvent) - the broker payload
// - Errors (OrderError) - invariant violations
// - Aggregate (Order) - the entity, built only through Order::create
// - Factory - conversions between request, event, entity and storage row
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod factory;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use factory::OrderRecord;
