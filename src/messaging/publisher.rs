use std::sync::Arc;
use std::time::Duration;

use super::message::OutboundMessage;
use super::transport::{Transport, TransportError};
use crate::codec::{encode_message, EncodingError, MessageFormat};
use crate::domain::order::{generate_random_order, Order, OrderError};
use crate::metrics::Metrics;
use crate::utils::{retry_on_transient, RetryConfig, RetryResult};

// ============================================================================
// Order Publisher
// ============================================================================
//
// Encodes orders in the configured wire format and hands them to a
// transport. JSON messages carry `message_format` and `order_id` attributes
// so consumers can route without decoding; Avro messages carry none.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Invalid order: {0}")]
    InvalidOrder(#[from] OrderError),

    #[error("Failed to encode order: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Failed to publish order: {0}")]
    Transport(#[from] TransportError),
}

/// Outcome of a publishing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub published: usize,
    pub failed: usize,
}

pub struct OrderPublisher {
    publisher_id: String,
    transport: Arc<dyn Transport>,
    topic: String,
    format: MessageFormat,
    schema: Option<String>,
    retry_config: RetryConfig,
    metrics: Option<Arc<Metrics>>,
}

impl OrderPublisher {
    pub fn new(
        publisher_id: impl Into<String>,
        transport: Arc<dyn Transport>,
        topic: impl Into<String>,
        format: MessageFormat,
    ) -> Self {
        Self {
            publisher_id: publisher_id.into(),
            transport,
            topic: topic.into(),
            format,
            schema: None,
            retry_config: RetryConfig::default(),
            metrics: None,
        }
    }

    /// Avro definition used for every encode. Required for Avro publishers.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn build_message(&self, order: &Order) -> Result<OutboundMessage, PublishError> {
        order.validate()?;

        let data = encode_message(order, self.format, self.schema.as_deref())?;
        let message = OutboundMessage::new(data);

        Ok(match self.format {
            MessageFormat::Json => message
                .with_attribute("message_format", MessageFormat::Json.as_str())
                .with_attribute("order_id", order.order_id.clone()),
            MessageFormat::Avro => message,
        })
    }

    /// Publish one order and return the transport message id.
    pub async fn publish(&self, order: &Order) -> Result<String, PublishError> {
        let result = self.publish_inner(order).await;

        if let Some(metrics) = &self.metrics {
            metrics.record_publish(self.format.as_str(), result.is_ok());
        }

        result
    }

    async fn publish_inner(&self, order: &Order) -> Result<String, PublishError> {
        let message = self.build_message(order)?;

        let result = retry_on_transient(&self.retry_config, |attempt| {
            let transport = self.transport.clone();
            let topic = self.topic.clone();
            let message = message.clone();

            async move {
                tracing::debug!(attempt = attempt, topic = %topic, "Attempting to publish order");
                transport.publish(&topic, message).await
            }
        })
        .await;

        match result {
            RetryResult::Success { value: message_id, attempts } => {
                tracing::info!(
                    publisher = %self.publisher_id,
                    message_id = %message_id,
                    attempts = attempts,
                    order_id = %order.order_id,
                    total_amount = order.total_amount,
                    format = %self.format,
                    "Published order"
                );
                Ok(message_id)
            }
            RetryResult::Exhausted { error, attempts } => {
                tracing::error!(
                    publisher = %self.publisher_id,
                    order_id = %order.order_id,
                    attempts = attempts,
                    error = %error,
                    "Failed to publish order after all retries"
                );
                Err(error.into())
            }
            RetryResult::Permanent { error, attempts } => {
                tracing::error!(
                    publisher = %self.publisher_id,
                    order_id = %order.order_id,
                    attempts = attempts,
                    error = %error,
                    "Permanent failure publishing order, not retrying"
                );
                Err(error.into())
            }
        }
    }

    /// Publish `count` generated orders, pausing `interval` between them.
    pub async fn publish_generated(&self, count: usize, interval: Duration) -> PublishSummary {
        let mut summary = PublishSummary::default();

        for i in 0..count {
            let order = generate_random_order();
            match self.publish(&order).await {
                Ok(message_id) => {
                    summary.published += 1;
                    tracing::info!(
                        publisher = %self.publisher_id,
                        message_id = %message_id,
                        "Published message {}/{}",
                        i + 1,
                        count
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(publisher = %self.publisher_id, error = %e, "Error publishing message");
                }
            }

            if i + 1 < count && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        }

        summary
    }
}
