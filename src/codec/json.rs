use super::error::{DecodingError, EncodingError};
use crate::domain::order::Order;

/// Keys a JSON order must carry before it is accepted.
pub const REQUIRED_KEYS: [&str; 6] = [
    "order_id",
    "customer_id",
    "status",
    "total_amount",
    "items",
    "shipping_address",
];

pub fn encode_json(order: &Order) -> Result<Vec<u8>, EncodingError> {
    Ok(serde_json::to_vec(order)?)
}

pub fn decode_json(bytes: &[u8]) -> Result<Order, DecodingError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;

    let object = value.as_object().ok_or(DecodingError::UnexpectedType {
        field: "order",
        expected: "object",
    })?;

    let missing: Vec<&'static str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(DecodingError::MissingKeys(missing));
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::aggregate::fixtures::sample_order;
    use crate::domain::order::enrichment::enrich_now;
    use crate::domain::order::OrderStatus;

    #[test]
    fn test_json_round_trip() {
        let order = sample_order();
        let bytes = encode_json(&order).unwrap();
        assert_eq!(decode_json(&bytes).unwrap(), order);
    }

    #[test]
    fn test_enriched_order_round_trips_through_json() {
        let enriched = enrich_now(sample_order()).unwrap();
        let bytes = encode_json(&enriched).unwrap();
        assert_eq!(decode_json(&bytes).unwrap(), enriched);
    }

    #[test]
    fn test_missing_keys_are_listed() {
        let payload = br#"{"order_id": "ORD-9", "customer_id": "C", "total_amount": 1.0}"#;

        let err = decode_json(payload).unwrap_err();
        match err {
            DecodingError::MissingKeys(keys) => {
                assert_eq!(keys, vec!["status", "items", "shipping_address"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_status_is_unspecified() {
        let payload = br#"{
            "order_id": "ORD-9",
            "customer_id": "CUST-1",
            "order_date": "2025-05-13T12:00:00Z",
            "status": null,
            "total_amount": 0.0,
            "items": [],
            "shipping_address": null
        }"#;

        let order = decode_json(payload).unwrap();
        assert_eq!(order.status, None);
        assert!(order.shipping_address.is_none());
    }

    #[test]
    fn test_empty_status_is_unspecified() {
        let mut value = serde_json::to_value(sample_order()).unwrap();
        value["status"] = serde_json::json!("");

        let order = decode_json(&serde_json::to_vec(&value).unwrap()).unwrap();
        assert_eq!(order.status, None);
        assert_eq!(order.order_id, "ORD-1");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut value = serde_json::to_value(sample_order()).unwrap();
        value["status"] = serde_json::json!("LOST");

        assert!(matches!(
            decode_json(&serde_json::to_vec(&value).unwrap()),
            Err(DecodingError::Json(_))
        ));
    }

    #[test]
    fn test_status_names() {
        let mut order = sample_order();
        order.status = Some(OrderStatus::Delivered);

        let value: serde_json::Value = serde_json::from_slice(&encode_json(&order).unwrap()).unwrap();
        assert_eq!(value["status"], "DELIVERED");
    }

    #[test]
    fn test_rejects_non_objects_and_garbage() {
        assert!(matches!(
            decode_json(b"[1, 2]"),
            Err(DecodingError::UnexpectedType { expected: "object", .. })
        ));
        assert!(matches!(decode_json(b"not json"), Err(DecodingError::Json(_))));
    }
}
