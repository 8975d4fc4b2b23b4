use chrono::{DateTime, Duration, Utc};

use super::aggregate::Order;
use super::errors::EnrichmentError;
use super::value_objects::{Fulfillment, FulfillmentStatus, OrderStatus};

// ============================================================================
// Order Enrichment Stage
// ============================================================================
//
// Turns a freshly decoded order into a processed one:
//   status               -> PROCESSED
//   processing_timestamp -> now
//   fulfillment          -> FULFILLED, now, now + 3 days, "WH-" + state
//
// A single clock read is shared by every derived timestamp. Calling the
// stage twice re-stamps the order, so it is not idempotent.
//
// ============================================================================

pub const ESTIMATED_DELIVERY_DAYS: i64 = 3;
pub const WAREHOUSE_PREFIX: &str = "WH-";

/// Source of wall-clock time for enrichment.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub fn warehouse_for_state(state: &str) -> String {
    format!("{WAREHOUSE_PREFIX}{state}")
}

/// Enrich an order using the given clock.
pub fn enrich(mut order: Order, clock: &dyn Clock) -> Result<Order, EnrichmentError> {
    let state = match &order.shipping_address {
        None => {
            return Err(EnrichmentError::MissingField {
                order_id: order.order_id,
                field: "shipping_address",
            })
        }
        Some(address) if address.state.is_empty() => {
            return Err(EnrichmentError::MissingField {
                order_id: order.order_id,
                field: "shipping_address.state",
            })
        }
        Some(address) => address.state.clone(),
    };

    if let Some(status) = order.status {
        if !status.can_be_processed() {
            return Err(EnrichmentError::InvalidStatusTransition {
                order_id: order.order_id,
                status,
            });
        }
    }

    if order.is_enriched() {
        tracing::debug!(order_id = %order.order_id, "Order already processed, re-stamping");
    }

    let now = clock.now();

    order.processing_timestamp = Some(now);
    order.status = Some(OrderStatus::Processed);
    order.fulfillment = Some(Fulfillment {
        status: FulfillmentStatus::Fulfilled,
        timestamp: now,
        estimated_delivery: now + Duration::days(ESTIMATED_DELIVERY_DAYS),
        warehouse_id: warehouse_for_state(&state),
    });

    tracing::info!(
        order_id = %order.order_id,
        warehouse_id = %warehouse_for_state(&state),
        "Processed order"
    );

    Ok(order)
}

/// Enrich an order against the system clock.
pub fn enrich_now(order: Order) -> Result<Order, EnrichmentError> {
    enrich(order, &SystemClock)
}


#[cfg(test)]
mod tests {
    use super::test_clock::ScriptedClock;
    use super::*;
    use crate::domain::order::aggregate::fixtures::sample_order;
    use chrono::TimeZone;

    fn instant(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 13, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_enrich_sets_processing_metadata() {
        let clock = ScriptedClock::fixed(instant(12));
        let original = sample_order();

        assert!(!original.is_enriched());
        let enriched = enrich(original.clone(), &clock).unwrap();

        assert!(enriched.is_enriched());
        assert_eq!(enriched.status, Some(OrderStatus::Processed));
        assert_eq!(enriched.processing_timestamp, Some(instant(12)));

        let fulfillment = enriched.fulfillment.as_ref().unwrap();
        assert_eq!(fulfillment.status, FulfillmentStatus::Fulfilled);
        assert_eq!(fulfillment.timestamp, instant(12));
        assert_eq!(
            fulfillment.estimated_delivery,
            Utc.with_ymd_and_hms(2025, 5, 16, 12, 0, 0).unwrap()
        );
        assert_eq!(fulfillment.warehouse_id, "WH-CA");

        // Everything else passes through untouched
        assert_eq!(enriched.order_id, original.order_id);
        assert_eq!(enriched.customer_id, original.customer_id);
        assert_eq!(enriched.order_date, original.order_date);
        assert_eq!(enriched.total_amount, original.total_amount);
        assert_eq!(enriched.items, original.items);
        assert_eq!(enriched.shipping_address, original.shipping_address);
    }

    #[test]
    fn test_enrich_against_system_clock() {
        let before = Utc::now();
        let enriched = enrich_now(sample_order()).unwrap();
        let after = Utc::now();

        let fulfillment = enriched.fulfillment.unwrap();
        let delivery = fulfillment.estimated_delivery;
        assert!(delivery >= before + Duration::days(3));
        assert!(delivery <= after + Duration::days(3));
        assert_eq!(enriched.processing_timestamp, Some(fulfillment.timestamp));
    }

    #[test]
    fn test_enrich_is_not_idempotent() {
        let clock = ScriptedClock::new(vec![instant(12), instant(13)]);

        let first = enrich(sample_order(), &clock).unwrap();
        assert!(first.is_enriched());
        let second = enrich(first.clone(), &clock).unwrap();

        assert_ne!(first.processing_timestamp, second.processing_timestamp);
        assert_ne!(
            first.fulfillment.as_ref().unwrap().timestamp,
            second.fulfillment.as_ref().unwrap().timestamp
        );
        assert_eq!(second.status, Some(OrderStatus::Processed));
    }

    #[test]
    fn test_enrich_missing_shipping_address() {
        let mut order = sample_order();
        order.shipping_address = None;

        let err = enrich_now(order).unwrap_err();

        assert_eq!(
            err,
            EnrichmentError::MissingField {
                order_id: "ORD-1".to_string(),
                field: "shipping_address",
            }
        );
    }

    #[test]
    fn test_enrich_missing_state() {
        let mut order = sample_order();
        if let Some(address) = order.shipping_address.as_mut() {
            address.state.clear();
        }

        let err = enrich_now(order).unwrap_err();

        assert!(matches!(
            err,
            EnrichmentError::MissingField { field: "shipping_address.state", .. }
        ));
        assert_eq!(err.order_id(), "ORD-1");
    }

    #[test]
    fn test_enrich_accepts_unspecified_status() {
        let mut order = sample_order();
        order.status = None;

        let enriched = enrich_now(order).unwrap();
        assert_eq!(enriched.status, Some(OrderStatus::Processed));
    }

    #[test]
    fn test_enrich_rejects_backward_transition() {
        for status in [OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Cancelled] {
            let mut order = sample_order();
            order.status = Some(status);

            let err = enrich_now(order).unwrap_err();
            assert_eq!(
                err,
                EnrichmentError::InvalidStatusTransition {
                    order_id: "ORD-1".to_string(),
                    status,
                }
            );
        }
    }

    #[test]
    fn test_warehouse_uses_state_verbatim() {
        assert_eq!(warehouse_for_state("ny"), "WH-ny");
        assert_eq!(warehouse_for_state("TX"), "WH-TX");
    }
}
