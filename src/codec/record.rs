use apache_avro::types::Value;
use std::collections::HashMap;

use super::error::{DecodingError, EncodingError};
use crate::domain::order::{Address, Order, OrderItem, OrderStatus};

// ============================================================================
// Typed mapping between `Order` and the generic Avro record value
// ============================================================================
//
// The Avro binary carries no field names, so the record layout is fixed here
// and checked against the caller's schema on every write. Reading goes the
// other way: any missing field or unexpected type is a decode error instead of
// a silently absent key.
//
// ============================================================================

pub(crate) fn order_to_value(order: &Order) -> Result<Value, EncodingError> {
    let address = order
        .shipping_address
        .as_ref()
        .ok_or_else(|| EncodingError::MissingField {
            order_id: order.order_id.clone(),
            field: "shipping_address",
        })?;

    let status = order.status.map(|s| s.as_str()).unwrap_or_default();

    Ok(Value::Record(vec![
        ("order_id".to_string(), Value::String(order.order_id.clone())),
        ("customer_id".to_string(), Value::String(order.customer_id.clone())),
        ("order_date".to_string(), Value::String(order.order_date.clone())),
        ("status".to_string(), Value::String(status.to_string())),
        ("total_amount".to_string(), Value::Double(order.total_amount)),
        (
            "items".to_string(),
            Value::Array(order.items.iter().map(item_to_value).collect()),
        ),
        ("shipping_address".to_string(), address_to_value(address)),
    ]))
}

fn item_to_value(item: &OrderItem) -> Value {
    Value::Record(vec![
        ("product_id".to_string(), Value::String(item.product_id.clone())),
        ("product_name".to_string(), Value::String(item.product_name.clone())),
        ("quantity".to_string(), Value::Int(item.quantity)),
        ("unit_price".to_string(), Value::Double(item.unit_price)),
    ])
}

fn address_to_value(address: &Address) -> Value {
    Value::Record(vec![
        ("street".to_string(), Value::String(address.street.clone())),
        ("city".to_string(), Value::String(address.city.clone())),
        ("state".to_string(), Value::String(address.state.clone())),
        ("zip".to_string(), Value::String(address.zip.clone())),
        ("country".to_string(), Value::String(address.country.clone())),
    ])
}

pub(crate) fn order_from_value(value: Value) -> Result<Order, DecodingError> {
    let mut fields = RecordFields::new("Order", "order", value)?;

    let status = match fields.string("status")?.as_str() {
        "" => None,
        raw => Some(raw.parse::<OrderStatus>().map_err(|e| DecodingError::InvalidValue {
            field: "status",
            reason: e.to_string(),
        })?),
    };

    let items = fields
        .array("items")?
        .into_iter()
        .map(item_from_value)
        .collect::<Result<Vec<_>, _>>()?;

    let shipping_address = match fields.take("shipping_address")? {
        Value::Null => None,
        value => Some(address_from_value(value)?),
    };

    Ok(Order {
        order_id: fields.string("order_id")?,
        customer_id: fields.string("customer_id")?,
        order_date: fields.string("order_date")?,
        status,
        total_amount: fields.double("total_amount")?,
        items,
        shipping_address,
        processing_timestamp: None,
        fulfillment: None,
    })
}

fn item_from_value(value: Value) -> Result<OrderItem, DecodingError> {
    let mut fields = RecordFields::new("OrderItem", "items", value)?;

    Ok(OrderItem {
        product_id: fields.string("product_id")?,
        product_name: fields.string("product_name")?,
        quantity: fields.int("quantity")?,
        unit_price: fields.double("unit_price")?,
    })
}

fn address_from_value(value: Value) -> Result<Address, DecodingError> {
    let mut fields = RecordFields::new("Address", "shipping_address", value)?;

    Ok(Address {
        street: fields.string("street")?,
        city: fields.string("city")?,
        state: fields.string("state")?,
        zip: fields.string("zip")?,
        country: fields.string("country")?,
    })
}

/// Field access over a decoded Avro record.
struct RecordFields {
    record: &'static str,
    fields: HashMap<String, Value>,
}

impl RecordFields {
    fn new(record: &'static str, field: &'static str, value: Value) -> Result<Self, DecodingError> {
        match unwrap_union(value) {
            Value::Record(fields) => Ok(Self {
                record,
                fields: fields.into_iter().collect(),
            }),
            _ => Err(DecodingError::UnexpectedType {
                field,
                expected: "record",
            }),
        }
    }

    fn take(&mut self, field: &'static str) -> Result<Value, DecodingError> {
        self.fields
            .remove(field)
            .map(unwrap_union)
            .ok_or(DecodingError::MissingField {
                record: self.record,
                field,
            })
    }

    fn string(&mut self, field: &'static str) -> Result<String, DecodingError> {
        match self.take(field)? {
            Value::String(s) => Ok(s),
            _ => Err(DecodingError::UnexpectedType {
                field,
                expected: "string",
            }),
        }
    }

    fn double(&mut self, field: &'static str) -> Result<f64, DecodingError> {
        match self.take(field)? {
            Value::Double(d) => Ok(d),
            Value::Float(f) => Ok(f64::from(f)),
            _ => Err(DecodingError::UnexpectedType {
                field,
                expected: "double",
            }),
        }
    }

    fn int(&mut self, field: &'static str) -> Result<i32, DecodingError> {
        match self.take(field)? {
            Value::Int(i) => Ok(i),
            Value::Long(l) => i32::try_from(l).map_err(|_| DecodingError::InvalidValue {
                field,
                reason: format!("{l} does not fit in an int"),
            }),
            _ => Err(DecodingError::UnexpectedType {
                field,
                expected: "int",
            }),
        }
    }

    fn array(&mut self, field: &'static str) -> Result<Vec<Value>, DecodingError> {
        match self.take(field)? {
            Value::Array(values) => Ok(values),
            _ => Err(DecodingError::UnexpectedType {
                field,
                expected: "array",
            }),
        }
    }
}

fn unwrap_union(value: Value) -> Value {
    match value {
        Value::Union(_, inner) => *inner,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::aggregate::fixtures::sample_order;

    #[test]
    fn test_value_round_trip() {
        let order = sample_order();
        let value = order_to_value(&order).unwrap();

        assert_eq!(order_from_value(value).unwrap(), order);
    }

    #[test]
    fn test_unspecified_status_is_empty_string() {
        let mut order = sample_order();
        order.status = None;

        let value = order_to_value(&order).unwrap();
        let Value::Record(fields) = &value else {
            panic!("expected a record");
        };
        assert_eq!(fields[3], ("status".to_string(), Value::String(String::new())));

        assert_eq!(order_from_value(value).unwrap().status, None);
    }

    #[test]
    fn test_missing_address_cannot_be_written() {
        let mut order = sample_order();
        order.shipping_address = None;

        let err = order_to_value(&order).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::MissingField { field: "shipping_address", .. }
        ));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let value = Value::Record(vec![(
            "order_id".to_string(),
            Value::String("ORD-1".to_string()),
        )]);

        let err = order_from_value(value).unwrap_err();
        assert!(matches!(err, DecodingError::MissingField { record: "Order", .. }));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let Value::Record(mut fields) = order_to_value(&sample_order()).unwrap() else {
            panic!("expected a record");
        };
        fields[4].1 = Value::String("699.99".to_string());

        let err = order_from_value(Value::Record(fields)).unwrap_err();
        assert!(matches!(
            err,
            DecodingError::UnexpectedType { field: "total_amount", expected: "double" }
        ));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let Value::Record(mut fields) = order_to_value(&sample_order()).unwrap() else {
            panic!("expected a record");
        };
        fields[3].1 = Value::String("PENDING".to_string());

        let err = order_from_value(Value::Record(fields)).unwrap_err();
        assert!(matches!(err, DecodingError::InvalidValue { field: "status", .. }));
    }

    #[test]
    fn test_long_quantity_is_narrowed() {
        let value = Value::Record(vec![
            ("product_id".to_string(), Value::String("p".to_string())),
            ("product_name".to_string(), Value::String("n".to_string())),
            ("quantity".to_string(), Value::Long(i64::from(i32::MAX) + 1)),
            ("unit_price".to_string(), Value::Double(1.0)),
        ]);

        let err = item_from_value(value).unwrap_err();
        assert!(matches!(err, DecodingError::InvalidValue { field: "quantity", .. }));
    }
}
