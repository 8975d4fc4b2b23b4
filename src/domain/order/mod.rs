// ============================================================================
// Order Domain - Business Logic for Order Events
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderItem, Address, OrderStatus, Fulfillment)
// - Errors (OrderError, EnrichmentError)
// - Order root entity with its total invariant
// - Enrichment stage (CREATED -> PROCESSED with fulfillment metadata)
// - Mock order generator
//
// Nothing here performs I/O; the wire formats live in `crate::codec`.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;
pub mod enrichment;
pub mod generator;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
pub use enrichment::{enrich, enrich_now, Clock, SystemClock};
pub use generator::{generate_order, generate_random_order};
