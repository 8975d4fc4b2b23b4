// ============================================================================
// Push Endpoint - HTTP surface for push deliveries
// ============================================================================
//
// POST /        unwrap the push envelope, decode, enrich, answer with JSON
// GET  /health  service status
//
// Metrics are served separately by `crate::metrics::start_metrics_server`.
//
// ============================================================================

mod handlers;

use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::metrics::Metrics;
use crate::pipeline::OrderPipeline;

pub use handlers::{health_handler, push_handler};

/// Shared state handed to every handler.
pub struct AppState {
    pub pipeline: OrderPipeline,
    pub metrics: Option<Arc<Metrics>>,
}

impl AppState {
    pub fn new(pipeline: OrderPipeline) -> Self {
        Self {
            pipeline,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Register the push routes on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::post().to(push_handler))
        .route("/health", web::get().to(health_handler));
}

/// Start the push endpoint and run until shutdown.
pub async fn start_push_server(state: web::Data<AppState>, config: &ServerConfig) -> std::io::Result<()> {
    let addr = config.addr();
    tracing::info!("🚀 Starting push endpoint on http://{}/", addr);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .workers(config.workers.max(1))
        .bind(addr)?
        .run()
        .await
}
