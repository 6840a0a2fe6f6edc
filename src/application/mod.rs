// ============================================================================
// Application Layer - use cases
// ============================================================================
//
// - SubmitOrderUseCase (gateway): request -> OrderCreatedEvent -> publish
// - CreateOrderUseCase (order service): payload -> Order -> repository
//
// Neither use case retries. Failures are returned to the caller, who decides
// whether to surface or drop them.
//
// ============================================================================

mod create_order;
mod submit_order;

pub use create_order::CreateOrderUseCase;
pub use submit_order::SubmitOrderUseCase;
