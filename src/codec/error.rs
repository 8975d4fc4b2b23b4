// ============================================================================
// Codec Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("Invalid schema definition: {0}")]
    InvalidSchema(#[source] apache_avro::Error),

    #[error("Order {order_id} is missing field {field} required by the schema")]
    MissingField {
        order_id: String,
        field: &'static str,
    },

    #[error("Order {order_id} does not match the schema: {source}")]
    SchemaMismatch {
        order_id: String,
        #[source]
        source: apache_avro::Error,
    },

    #[error("An Avro message format needs a schema definition")]
    SchemaRequired,

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    #[error("Invalid schema definition: {0}")]
    InvalidSchema(#[source] apache_avro::Error),

    #[error("Malformed Avro payload: {0}")]
    Malformed(#[source] apache_avro::Error),

    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("{remaining} bytes left after decoding the record, schema mismatch suspected")]
    TrailingBytes { remaining: usize },

    #[error("Record {record} has no field {field}")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("Field {field} should be {expected}")]
    UnexpectedType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Field {field} holds an invalid value: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Missing required keys in order: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("An Avro message format needs a schema definition")]
    SchemaRequired,
}
