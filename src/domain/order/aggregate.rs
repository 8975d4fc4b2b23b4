use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::errors::OrderError;
use super::value_objects::{Address, Fulfillment, OrderItem, OrderStatus};

// ============================================================================
// Order - root entity carried by every order event
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub order_id: String,
    pub customer_id: String,
    pub order_date: String,

    // Lifecycle. `None` when an upstream producer leaves it unspecified.
    #[serde(deserialize_with = "blank_status_as_none")]
    pub status: Option<OrderStatus>,

    // Contents
    pub total_amount: f64,
    pub items: Vec<OrderItem>,
    pub shipping_address: Option<Address>,

    // Set by enrichment, never part of the Avro record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<Fulfillment>,
}

/// `null` and `""` both mean "unspecified", matching the Avro mapping.
fn blank_status_as_none<'de, D>(deserializer: D) -> Result<Option<OrderStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(status) if status.is_empty() => Ok(None),
        Some(status) => status.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Round a currency amount to cents.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

impl Order {
    /// Sum of `quantity * unit_price` over all items, rounded to cents.
    pub fn computed_total(&self) -> f64 {
        round_currency(self.items.iter().map(OrderItem::item_total).sum())
    }

    pub fn has_consistent_total(&self) -> bool {
        (round_currency(self.total_amount) - self.computed_total()).abs() < 0.005
    }

    pub fn is_enriched(&self) -> bool {
        self.processing_timestamp.is_some() && self.fulfillment.is_some()
    }

    /// Validate business rules before an order is published
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.order_id.trim().is_empty() {
            return Err(OrderError::EmptyOrderId);
        }

        if self.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        for item in &self.items {
            if item.quantity <= 0 {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
            if item.unit_price.is_nan() || item.unit_price < 0.0 {
                return Err(OrderError::InvalidUnitPrice {
                    product_id: item.product_id.clone(),
                    unit_price: item.unit_price,
                });
            }
        }

        if !self.has_consistent_total() {
            return Err(OrderError::TotalMismatch {
                expected: self.computed_total(),
                actual: self.total_amount,
            });
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_order;
    use super::*;

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(10.005_1), 10.01);
        assert_eq!(round_currency(59.970_000_000_000_006), 59.97);
        assert_eq!(round_currency(0.0), 0.0);
    }

    #[test]
    fn test_computed_total_sums_items() {
        let mut order = sample_order();
        order.items.push(OrderItem {
            product_id: "prod-002".to_string(),
            product_name: "Charger".to_string(),
            quantity: 3,
            unit_price: 19.99,
        });

        assert_eq!(order.computed_total(), 759.96);
        assert!(!order.has_consistent_total());

        order.total_amount = 759.96;
        assert!(order.has_consistent_total());
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert_eq!(sample_order().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_orders() {
        let mut order = sample_order();
        order.items.clear();
        order.total_amount = 0.0;
        assert_eq!(order.validate(), Err(OrderError::EmptyItems));

        let mut order = sample_order();
        order.items[0].quantity = 0;
        assert_eq!(order.validate(), Err(OrderError::InvalidQuantity(0)));

        let mut order = sample_order();
        order.total_amount = 1234.56;
        assert!(matches!(order.validate(), Err(OrderError::TotalMismatch { .. })));

        let mut order = sample_order();
        order.order_id = "  ".to_string();
        assert_eq!(order.validate(), Err(OrderError::EmptyOrderId));
    }

    #[test]
    fn test_json_omits_enrichment_fields_until_set() {
        let json = serde_json::to_value(sample_order()).unwrap();

        assert!(json.get("processing_timestamp").is_none());
        assert!(json.get("fulfillment").is_none());
        assert_eq!(json["status"], "CREATED");
        assert_eq!(json["shipping_address"]["state"], "CA");
    }
}
