use apache_avro::{from_avro_datum, max_allocation_bytes, to_avro_datum, Schema};

use super::error::{DecodingError, EncodingError};
use super::record::{order_from_value, order_to_value};
use crate::domain::order::Order;

// ============================================================================
// Schema-bound Avro Codec
// ============================================================================
//
// Raw Avro datums: no container header, no fingerprint, no field names.
// Writer and reader MUST use structurally identical schemas. The schema is
// parsed on every call and never retained.
//
// Inbound payloads are untrusted. The reader reserves memory for every
// length prefix it meets (strings, array blocks) before reading the items,
// so both the payload size and the per-prefix allocation are capped.
//
// ============================================================================

/// Largest Avro datum `decode` accepts. Also the cap on any single length
/// prefix inside it.
pub const MAX_PAYLOAD_BYTES: usize = 1 << 20;

/// Encode an order as a single Avro datum under `schema_definition`.
pub fn encode(order: &Order, schema_definition: &str) -> Result<Vec<u8>, EncodingError> {
    let schema = Schema::parse_str(schema_definition).map_err(EncodingError::InvalidSchema)?;
    let value = order_to_value(order)?;

    let bytes = to_avro_datum(&schema, value).map_err(|source| EncodingError::SchemaMismatch {
        order_id: order.order_id.clone(),
        source,
    })?;

    tracing::debug!(
        order_id = %order.order_id,
        size = bytes.len(),
        "Serialized Avro data"
    );

    Ok(bytes)
}

/// Decode exactly one Avro datum written with `schema_definition`.
pub fn decode(bytes: &[u8], schema_definition: &str) -> Result<Order, DecodingError> {
    if bytes.len() > MAX_PAYLOAD_BYTES {
        return Err(DecodingError::PayloadTooLarge {
            size: bytes.len(),
            limit: MAX_PAYLOAD_BYTES,
        });
    }

    let schema = Schema::parse_str(schema_definition).map_err(DecodingError::InvalidSchema)?;

    // First call fixes the process-wide limit; later calls only read it
    let limit = max_allocation_bytes(MAX_PAYLOAD_BYTES);
    if limit > MAX_PAYLOAD_BYTES {
        tracing::warn!(limit = limit, "Avro allocation limit was set elsewhere above the payload cap");
    }

    let mut reader = bytes;
    let value = from_avro_datum(&schema, &mut reader, None).map_err(DecodingError::Malformed)?;

    if !reader.is_empty() {
        return Err(DecodingError::TrailingBytes {
            remaining: reader.len(),
        });
    }

    let order = order_from_value(value)?;

    tracing::debug!(
        order_id = %order.order_id,
        size = bytes.len(),
        "Deserialized Avro data"
    );

    Ok(order)
}
