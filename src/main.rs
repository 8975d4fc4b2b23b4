use actix_web::web;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_events::codec::MessageFormat;
use order_events::config::AppConfig;
use order_events::messaging::{InMemoryBroker, OrderPublisher, OrderSubscriber, Transport};
use order_events::metrics::{self, Metrics};
use order_events::pipeline::OrderPipeline;
use order_events::schema::{InMemorySchemaRegistry, SchemaProvider};
use order_events::server::{self, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_events=debug"))
        )
        .init();

    tracing::info!("🚀 Starting order events service");

    let config = AppConfig::load()?;
    tracing::info!(
        project = %config.project_id,
        schema = %config.schema_name,
        topic = %config.topic,
        subscription = %config.subscription,
        format = %config.message_format,
        "Configuration loaded"
    );

    // === 1. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 2. Schema registry (seeded with the order schema) ===
    let schemas: Arc<dyn SchemaProvider> = Arc::new(InMemorySchemaRegistry::with_order_schema(
        config.project_id.clone(),
        &config.schema_name,
    ));

    // === 3. Pull path: publishers -> in-memory broker -> subscribers ===
    run_pull_demo(&config, schemas.as_ref(), metrics.clone()).await?;

    // === 4. Push path: HTTP endpoint plus metrics endpoint ===
    let pipeline = OrderPipeline::new(schemas, config.schema_name.clone()).with_metrics(metrics.clone());
    let state = web::Data::new(AppState::new(pipeline).with_metrics(metrics.clone()));

    if config.metrics.enabled {
        let registry = Arc::new(metrics.registry().clone());
        tokio::try_join!(
            server::start_push_server(state, &config.server),
            metrics::start_metrics_server(registry, config.metrics.port),
        )?;
    } else {
        server::start_push_server(state, &config.server).await?;
    }

    tracing::info!("👋 Shutdown complete");

    Ok(())
}

async fn run_pull_demo(
    config: &AppConfig,
    schemas: &dyn SchemaProvider,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    let schema = match config.message_format {
        MessageFormat::Avro => {
            let schema = schemas.get_schema(&config.schema_name).await?;
            tracing::info!("Successfully fetched schema from registry");
            Some(schema)
        }
        MessageFormat::Json => None,
    };

    let (broker, subscription) = InMemoryBroker::new(
        config.topic.clone(),
        &config.subscription,
        config.subscriber.channel_capacity,
        config.subscriber.max_delivery_attempts,
    );
    let report = broker.report();
    let transport: Arc<dyn Transport> = Arc::new(broker);

    let workers: Vec<_> = (1..=config.subscriber.subscribers.max(1))
        .map(|id| {
            let mut subscriber = OrderSubscriber::new(id.to_string(), config.message_format)
                .with_metrics(metrics.clone());
            if let Some(schema) = &schema {
                subscriber = subscriber.with_schema(schema.clone());
            }
            tokio::spawn(subscriber.run(subscription.clone()))
        })
        .collect();
    drop(subscription);

    let publishers: Vec<_> = (1..=config.publisher.publishers.max(1))
        .map(|id| {
            let mut publisher = OrderPublisher::new(
                id.to_string(),
                transport.clone(),
                config.topic.clone(),
                config.message_format,
            )
            .with_retry(config.publisher.retry_config())
            .with_metrics(metrics.clone());
            if let Some(schema) = &schema {
                publisher = publisher.with_schema(schema.clone());
            }
            publisher
        })
        .collect();
    drop(transport);

    let summaries = join_all(publishers.iter().map(|publisher| {
        publisher.publish_generated(config.publisher.messages_per_publisher, config.publisher.interval())
    }))
    .await;
    // Dropping the publishers drops the broker; subscribers drain and stop
    drop(publishers);

    let published: usize = summaries.iter().map(|s| s.published).sum();
    let failed: usize = summaries.iter().map(|s| s.failed).sum();

    let mut received = 0;
    for worker in join_all(workers).await {
        received += worker?;
    }

    let dead_letters = report.dead_letters().await.len();

    tracing::info!(
        published = published,
        failed = failed,
        received = received,
        acked = report.acked(),
        nacked = report.nacked(),
        dead_letters = dead_letters,
        "✅ Pull demo complete"
    );

    Ok(())
}
