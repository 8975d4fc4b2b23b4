use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order id cannot be empty")]
    EmptyOrderId,

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Invalid unit price for {product_id}: {unit_price}")]
    InvalidUnitPrice { product_id: String, unit_price: f64 },

    #[error("Total amount {actual} does not match item totals {expected}")]
    TotalMismatch { expected: f64, actual: f64 },
}

// ============================================================================
// Enrichment Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Order {order_id} is missing required field {field}")]
    MissingField {
        order_id: String,
        field: &'static str,
    },

    #[error("Cannot process order {order_id} in status {status}")]
    InvalidStatusTransition {
        order_id: String,
        status: OrderStatus,
    },
}

impl EnrichmentError {
    pub fn order_id(&self) -> &str {
        match self {
            EnrichmentError::MissingField { order_id, .. }
            | EnrichmentError::InvalidStatusTransition { order_id, .. } => order_id,
        }
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            EnrichmentError::MissingField { .. } => "missing_field",
            EnrichmentError::InvalidStatusTransition { .. } => "invalid_status",
        }
    }
}
