// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Payload decoding per wire format
// - Enrichment outcomes
// - Publishing throughput and failures
// - Pull deliveries acknowledged / negatively acknowledged
// - Push endpoint responses
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Codec Metrics
    pub messages_decoded: IntCounterVec,
    pub decode_failures: IntCounterVec,

    // Enrichment Metrics
    pub orders_enriched: IntCounter,
    pub enrichment_failures: IntCounterVec,

    // Publisher Metrics
    pub messages_published: IntCounterVec,
    pub publish_failures: IntCounterVec,

    // Subscriber Metrics
    pub deliveries: IntCounterVec,

    // Push Endpoint Metrics
    pub push_responses: IntCounterVec,

    pub processing_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let messages_decoded = IntCounterVec::new(
            Opts::new("order_messages_decoded_total", "Order payloads decoded"),
            &["format"],
        )?;
        registry.register(Box::new(messages_decoded.clone()))?;

        let decode_failures = IntCounterVec::new(
            Opts::new("order_decode_failures_total", "Order payloads that failed to decode"),
            &["format"],
        )?;
        registry.register(Box::new(decode_failures.clone()))?;

        let orders_enriched = IntCounter::new("orders_enriched_total", "Orders moved to PROCESSED")?;
        registry.register(Box::new(orders_enriched.clone()))?;

        let enrichment_failures = IntCounterVec::new(
            Opts::new("order_enrichment_failures_total", "Orders rejected by enrichment"),
            &["reason"],
        )?;
        registry.register(Box::new(enrichment_failures.clone()))?;

        let messages_published = IntCounterVec::new(
            Opts::new("order_messages_published_total", "Order messages published"),
            &["format"],
        )?;
        registry.register(Box::new(messages_published.clone()))?;

        let publish_failures = IntCounterVec::new(
            Opts::new("order_publish_failures_total", "Order messages that could not be published"),
            &["format"],
        )?;
        registry.register(Box::new(publish_failures.clone()))?;

        let deliveries = IntCounterVec::new(
            Opts::new("order_deliveries_total", "Pulled deliveries by outcome"),
            &["subscriber", "outcome"],
        )?;
        registry.register(Box::new(deliveries.clone()))?;

        let push_responses = IntCounterVec::new(
            Opts::new("order_push_responses_total", "Push endpoint responses by status code"),
            &["status"],
        )?;
        registry.register(Box::new(push_responses.clone()))?;

        let processing_duration = HistogramVec::new(
            HistogramOpts::new("order_processing_duration_seconds", "Decode and enrichment duration")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            &["stage"],
        )?;
        registry.register(Box::new(processing_duration.clone()))?;

        Ok(Self {
            registry,
            messages_decoded,
            decode_failures,
            orders_enriched,
            enrichment_failures,
            messages_published,
            publish_failures,
            deliveries,
            push_responses,
            processing_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_decode(&self, format: &str, success: bool) {
        if success {
            self.messages_decoded.with_label_values(&[format]).inc();
        } else {
            self.decode_failures.with_label_values(&[format]).inc();
        }
    }

    pub fn record_enrichment(&self, failure_reason: Option<&str>) {
        match failure_reason {
            None => self.orders_enriched.inc(),
            Some(reason) => self.enrichment_failures.with_label_values(&[reason]).inc(),
        }
    }

    pub fn record_publish(&self, format: &str, success: bool) {
        if success {
            self.messages_published.with_label_values(&[format]).inc();
        } else {
            self.publish_failures.with_label_values(&[format]).inc();
        }
    }

    pub fn record_delivery(&self, subscriber: &str, acked: bool) {
        let outcome = if acked { "ack" } else { "nack" };
        self.deliveries.with_label_values(&[subscriber, outcome]).inc();
    }

    pub fn record_push_response(&self, status: u16) {
        self.push_responses.with_label_values(&[&status.to_string()]).inc();
    }

    pub fn observe_duration(&self, stage: &str, duration_secs: f64) {
        self.processing_duration.with_label_values(&[stage]).observe(duration_secs);
    }
}
