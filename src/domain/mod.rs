// ============================================================================
// Domain Layer
// ============================================================================
//
// Pure business types. Nothing here touches the broker, the database or
// HTTP; adapters in other modules convert to and from these types.
//
// ============================================================================

pub mod order;
