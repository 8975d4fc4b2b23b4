use std::sync::Arc;
use std::time::Instant;

use super::message::PubsubMessage;
use super::transport::Subscription;
use crate::codec::{decode_message, DecodingError, MessageFormat};
use crate::domain::order::Order;
use crate::metrics::Metrics;

// ============================================================================
// Order Subscriber - receive, process, ack/nack
// ============================================================================
//
// Each delivery is decoded in the configured format and logged. Success
// acknowledges the message; any failure negatively acknowledges it and
// leaves redelivery to the transport.
//
// ============================================================================

pub struct OrderSubscriber {
    subscriber_id: String,
    format: MessageFormat,
    schema: Option<String>,
    metrics: Option<Arc<Metrics>>,
}

impl OrderSubscriber {
    pub fn new(subscriber_id: impl Into<String>, format: MessageFormat) -> Self {
        Self {
            subscriber_id: subscriber_id.into(),
            format,
            schema: None,
            metrics: None,
        }
    }

    /// Avro definition fetched once at startup and reused for every message.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Decode one message and log its contents.
    pub fn handle(&self, message: &PubsubMessage) -> Result<Order, DecodingError> {
        let started = Instant::now();
        let result = decode_message(&message.data, self.format, self.schema.as_deref());

        if let Some(metrics) = &self.metrics {
            metrics.record_decode(self.format.as_str(), result.is_ok());
            metrics.observe_duration("decode", started.elapsed().as_secs_f64());
        }

        let order = result?;
        self.log_order(message, &order);
        Ok(order)
    }

    fn log_order(&self, message: &PubsubMessage, order: &Order) {
        tracing::info!(
            subscriber = %self.subscriber_id,
            message_id = %message.message_id,
            order_id = %order.order_id,
            customer_id = %order.customer_id,
            status = ?order.status,
            total_amount = order.total_amount,
            items = order.items.len(),
            "Received {} order",
            self.format
        );

        for (idx, item) in order.items.iter().enumerate() {
            tracing::debug!(
                order_id = %order.order_id,
                "  Item {}: {} x {} @ ${} each",
                idx + 1,
                item.quantity,
                item.product_name,
                item.unit_price
            );
        }

        if let Some(addr) = &order.shipping_address {
            tracing::debug!(
                order_id = %order.order_id,
                "Shipping to: {}, {}, {} {}, {}",
                addr.street,
                addr.city,
                addr.state,
                addr.zip,
                addr.country
            );
        }

        for (key, value) in &message.attributes {
            tracing::debug!(message_id = %message.message_id, "  attribute {}: {}", key, value);
        }
    }

    /// Consume deliveries until the subscription closes. Returns the number
    /// of messages received.
    pub async fn run(self, subscription: Subscription) -> usize {
        tracing::info!(
            subscriber = %self.subscriber_id,
            subscription = %subscription.name(),
            format = %self.format,
            "Subscriber started. Listening for messages..."
        );

        let mut received = 0;

        while let Some(delivery) = subscription.next().await {
            received += 1;

            let acked = match self.handle(&delivery.message) {
                Ok(_) => {
                    tracing::debug!(
                        subscriber = %self.subscriber_id,
                        message_id = %delivery.message.message_id,
                        "Message acknowledged"
                    );
                    delivery.ack();
                    true
                }
                Err(e) => {
                    tracing::warn!(
                        subscriber = %self.subscriber_id,
                        subscription = %subscription.name(),
                        message_id = %delivery.message.message_id,
                        attempt = delivery.delivery_attempt,
                        error = %e,
                        "Error processing message, sending nack"
                    );
                    delivery.nack();
                    false
                }
            };

            if let Some(metrics) = &self.metrics {
                metrics.record_delivery(&self.subscriber_id, acked);
            }
        }

        tracing::info!(
            subscriber = %self.subscriber_id,
            subscription = %subscription.name(),
            received = received,
            "Subscriber finished"
        );

        received
    }
}
