use std::sync::Arc;
use std::time::Instant;

use crate::codec::{avro, DecodingError, MessageFormat};
use crate::domain::order::{enrich, Clock, EnrichmentError, Order, SystemClock};
use crate::metrics::Metrics;
use crate::schema::{SchemaError, SchemaProvider};

// ============================================================================
// Order Pipeline - schema lookup, decode, enrich
// ============================================================================
//
// Consume path shared by the push endpoint:
//   1. fetch the Avro definition from the schema provider
//   2. decode the payload against it
//   3. run the enrichment stage
//
// The schema is fetched per message; caching belongs to the provider.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid push envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Failed to retrieve schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to deserialize message: {0}")]
    Decoding(#[from] DecodingError),

    #[error("Failed to process order: {0}")]
    Enrichment(#[from] EnrichmentError),
}

impl PipelineError {
    /// Status code reported to the push transport. Client-side payload
    /// problems are 400, everything else is 500.
    pub fn http_status(&self) -> u16 {
        match self {
            PipelineError::InvalidEnvelope(_) | PipelineError::Decoding(_) => 400,
            PipelineError::Schema(_) | PipelineError::Enrichment(_) => 500,
        }
    }
}

pub struct OrderPipeline {
    schemas: Arc<dyn SchemaProvider>,
    schema_name: String,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<Metrics>>,
}

impl OrderPipeline {
    pub fn new(schemas: Arc<dyn SchemaProvider>, schema_name: impl Into<String>) -> Self {
        Self {
            schemas,
            schema_name: schema_name.into(),
            clock: Arc::new(SystemClock),
            metrics: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Decode an Avro payload and enrich the resulting order.
    pub async fn process_avro(&self, bytes: &[u8]) -> Result<Order, PipelineError> {
        let schema = self
            .schemas
            .get_schema(&self.schema_name)
            .await
            .inspect_err(|e| tracing::error!(schema = %self.schema_name, error = %e, "Error getting schema"))?;

        let order = self.decode(bytes, &schema)?;
        tracing::info!(
            order_id = %order.order_id,
            customer_id = %order.customer_id,
            total_amount = order.total_amount,
            "Received AVRO order"
        );

        Ok(self.enrich(order)?)
    }

    fn decode(&self, bytes: &[u8], schema: &str) -> Result<Order, DecodingError> {
        let started = Instant::now();
        let result = avro::decode(bytes, schema);

        if let Some(metrics) = &self.metrics {
            metrics.record_decode(MessageFormat::Avro.as_str(), result.is_ok());
            metrics.observe_duration("decode", started.elapsed().as_secs_f64());
        }

        if let Err(e) = &result {
            tracing::warn!(error = %e, bytes = bytes.len(), "Error deserializing Avro message");
        }

        result
    }

    fn enrich(&self, order: Order) -> Result<Order, EnrichmentError> {
        let started = Instant::now();
        let result = enrich(order, self.clock.as_ref());

        if let Some(metrics) = &self.metrics {
            metrics.record_enrichment(result.as_ref().err().map(EnrichmentError::reason));
            metrics.observe_duration("enrich", started.elapsed().as_secs_f64());
        }

        if let Err(e) = &result {
            tracing::warn!(order_id = %e.order_id(), error = %e, "Error processing order");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::aggregate::fixtures::sample_order;
    use crate::domain::order::enrichment::test_clock::ScriptedClock;
    use crate::domain::order::{FulfillmentStatus, OrderStatus};
    use crate::schema::{InMemorySchemaRegistry, RegisteredSchema, SchemaType, ORDER_SCHEMA};
    use chrono::{Duration, TimeZone, Utc};

    fn pipeline(registry: InMemorySchemaRegistry) -> OrderPipeline {
        let now = Utc.with_ymd_and_hms(2025, 5, 13, 12, 30, 0).unwrap();
        OrderPipeline::new(Arc::new(registry), "orders-schema").with_clock(Arc::new(ScriptedClock::fixed(now)))
    }

    #[tokio::test]
    async fn test_process_avro_enriches_order() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let pipeline = pipeline(InMemorySchemaRegistry::with_order_schema("demo", "orders-schema"))
            .with_metrics(metrics.clone());
        let bytes = avro::encode(&sample_order(), ORDER_SCHEMA).unwrap();

        let order = pipeline.process_avro(&bytes).await.unwrap();

        let now = Utc.with_ymd_and_hms(2025, 5, 13, 12, 30, 0).unwrap();
        let fulfillment = order.fulfillment.as_ref().unwrap();
        assert_eq!(order.status, Some(OrderStatus::Processed));
        assert_eq!(order.processing_timestamp, Some(now));
        assert_eq!(fulfillment.status, FulfillmentStatus::Fulfilled);
        assert_eq!(fulfillment.estimated_delivery, now + Duration::days(3));
        assert_eq!(fulfillment.warehouse_id, "WH-CA");
        assert_eq!(metrics.orders_enriched.get(), 1);
    }

    #[tokio::test]
    async fn test_missing_schema_is_server_error() {
        let pipeline = pipeline(InMemorySchemaRegistry::new("demo"));
        let bytes = avro::encode(&sample_order(), ORDER_SCHEMA).unwrap();

        let err = pipeline.process_avro(&bytes).await.unwrap_err();
        assert!(matches!(err, PipelineError::Schema(SchemaError::NotFound(_))));
        assert_eq!(err.http_status(), 500);
    }

    #[tokio::test]
    async fn test_wrong_schema_type_is_server_error() {
        let registry = InMemorySchemaRegistry::new("demo");
        registry
            .register(RegisteredSchema {
                name: "orders-schema".to_string(),
                schema_type: SchemaType::ProtocolBuffer,
                definition: "syntax = \"proto3\";".to_string(),
            })
            .await
            .unwrap();

        let err = pipeline(registry).process_avro(b"\x00").await.unwrap_err();
        assert!(matches!(err, PipelineError::Schema(SchemaError::WrongType { .. })));
        assert_eq!(err.http_status(), 500);
    }

    #[tokio::test]
    async fn test_garbage_is_client_error() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let pipeline = pipeline(InMemorySchemaRegistry::with_order_schema("demo", "orders-schema"))
            .with_metrics(metrics.clone());

        let err = pipeline.process_avro(b"not avro at all").await.unwrap_err();
        assert!(matches!(err, PipelineError::Decoding(_)));
        assert_eq!(err.http_status(), 400);
        assert_eq!(metrics.decode_failures.with_label_values(&["AVRO"]).get(), 1);
    }

    #[tokio::test]
    async fn test_empty_state_is_server_error() {
        let pipeline = pipeline(InMemorySchemaRegistry::with_order_schema("demo", "orders-schema"));
        let mut order = sample_order();
        if let Some(address) = order.shipping_address.as_mut() {
            address.state.clear();
        }
        let bytes = avro::encode(&order, ORDER_SCHEMA).unwrap();

        let err = pipeline.process_avro(&bytes).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Enrichment(EnrichmentError::MissingField {
                field: "shipping_address.state",
                ..
            })
        ));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn test_envelope_errors_are_client_errors() {
        assert_eq!(PipelineError::InvalidEnvelope("bad base64".into()).http_status(), 400);
    }
}
