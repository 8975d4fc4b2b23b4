// ============================================================================
// Schema Provider - contract with the external schema registry
// ============================================================================
//
// The codec never owns a schema: callers fetch the definition by name and
// pass the returned string into each encode/decode call. Caching, if any,
// belongs to the provider.
//
// ============================================================================

mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use registry::InMemorySchemaRegistry;

/// Canonical Avro definition of an order event.
pub const ORDER_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Order",
    "namespace": "com.ecommerce",
    "fields": [
        {"name": "order_id", "type": "string"},
        {"name": "customer_id", "type": "string"},
        {"name": "order_date", "type": "string"},
        {"name": "status", "type": "string"},
        {"name": "total_amount", "type": "double"},
        {
            "name": "items",
            "type": {
                "type": "array",
                "items": {
                    "type": "record",
                    "name": "OrderItem",
                    "fields": [
                        {"name": "product_id", "type": "string"},
                        {"name": "product_name", "type": "string"},
                        {"name": "quantity", "type": "int"},
                        {"name": "unit_price", "type": "double"}
                    ]
                }
            }
        },
        {
            "name": "shipping_address",
            "type": {
                "type": "record",
                "name": "Address",
                "fields": [
                    {"name": "street", "type": "string"},
                    {"name": "city", "type": "string"},
                    {"name": "state", "type": "string"},
                    {"name": "zip", "type": "string"},
                    {"name": "country", "type": "string"}
                ]
            }
        }
    ]
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    Avro,
    ProtocolBuffer,
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Avro => f.write_str("AVRO"),
            SchemaType::ProtocolBuffer => f.write_str("PROTOCOL_BUFFER"),
        }
    }
}

/// A schema as stored by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSchema {
    pub name: String,
    pub schema_type: SchemaType,
    pub definition: String,
}

impl RegisteredSchema {
    pub fn avro(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_type: SchemaType::Avro,
            definition: definition.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema {0} not found")]
    NotFound(String),

    #[error("Schema {name} is not of type AVRO (found {found})")]
    WrongType { name: String, found: SchemaType },

    #[error("Schema {0} has no definition")]
    EmptyDefinition(String),

    #[error("Invalid schema name: {0:?}")]
    InvalidName(String),
}

/// Fully qualified registry path of a schema.
pub fn schema_path(project_id: &str, schema_name: &str) -> String {
    format!("projects/{project_id}/schemas/{schema_name}")
}

/// Source of Avro schema definitions, looked up by short name.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn get_schema(&self, name: &str) -> Result<String, SchemaError>;
}
