// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Order events are the only aggregate this service understands. Encoding,
// schema lookup and transport are kept out of this layer.
//
// ============================================================================

pub mod order;
