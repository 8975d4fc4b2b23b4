use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{schema_path, RegisteredSchema, SchemaError, SchemaProvider, SchemaType, ORDER_SCHEMA};

/// In-process registry implementing the schema provider contract.
pub struct InMemorySchemaRegistry {
    project_id: String,
    schemas: RwLock<HashMap<String, RegisteredSchema>>,
}

impl InMemorySchemaRegistry {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Registry pre-seeded with the canonical order schema under `schema_name`.
    pub fn with_order_schema(project_id: impl Into<String>, schema_name: &str) -> Self {
        let mut schemas = HashMap::new();
        schemas.insert(
            schema_name.to_string(),
            RegisteredSchema::avro(schema_name, ORDER_SCHEMA),
        );

        Self {
            project_id: project_id.into(),
            schemas: RwLock::new(schemas),
        }
    }

    pub async fn register(&self, schema: RegisteredSchema) -> Result<(), SchemaError> {
        if schema.name.trim().is_empty() {
            return Err(SchemaError::InvalidName(schema.name));
        }

        tracing::info!(
            schema = %schema_path(&self.project_id, &schema.name),
            schema_type = %schema.schema_type,
            "Registered schema"
        );

        self.schemas.write().await.insert(schema.name.clone(), schema);
        Ok(())
    }

    pub async fn remove(&self, name: &str) -> Option<RegisteredSchema> {
        self.schemas.write().await.remove(name)
    }
}

#[async_trait]
impl SchemaProvider for InMemorySchemaRegistry {
    async fn get_schema(&self, name: &str) -> Result<String, SchemaError> {
        if name.trim().is_empty() {
            return Err(SchemaError::InvalidName(name.to_string()));
        }

        let schemas = self.schemas.read().await;
        let schema = schemas
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        if schema.schema_type != SchemaType::Avro {
            return Err(SchemaError::WrongType {
                name: name.to_string(),
                found: schema.schema_type,
            });
        }

        if schema.definition.trim().is_empty() {
            return Err(SchemaError::EmptyDefinition(name.to_string()));
        }

        tracing::debug!(
            schema = %schema_path(&self.project_id, name),
            "Schema fetched from registry"
        );

        Ok(schema.definition.clone())
    }
}
