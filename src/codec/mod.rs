// ============================================================================
// Codec Module - order payload wire formats
// ============================================================================
//
// - avro: schema-bound binary datums (schema supplied per call)
// - json: self-describing JSON with a required-key check
//
// ============================================================================

pub mod avro;
pub mod error;
pub mod json;
mod record;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::order::Order;

pub use error::{DecodingError, EncodingError};
pub use json::{decode_json, encode_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    #[serde(alias = "JSON")]
    Json,
    #[default]
    #[serde(alias = "AVRO")]
    Avro,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Json => "JSON",
            MessageFormat::Avro => "AVRO",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "JSON" => Ok(MessageFormat::Json),
            "AVRO" => Ok(MessageFormat::Avro),
            other => Err(format!("unknown message format: {other}")),
        }
    }
}

/// Encode an order in the given format. Avro needs the schema definition.
pub fn encode_message(
    order: &Order,
    format: MessageFormat,
    schema: Option<&str>,
) -> Result<Vec<u8>, EncodingError> {
    match format {
        MessageFormat::Json => encode_json(order),
        MessageFormat::Avro => avro::encode(order, schema.ok_or(EncodingError::SchemaRequired)?),
    }
}

/// Decode an order in the given format. Avro needs the schema definition.
pub fn decode_message(
    bytes: &[u8],
    format: MessageFormat,
    schema: Option<&str>,
) -> Result<Order, DecodingError> {
    match format {
        MessageFormat::Json => decode_json(bytes),
        MessageFormat::Avro => avro::decode(bytes, schema.ok_or(DecodingError::SchemaRequired)?),
    }
}
