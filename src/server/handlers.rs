use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;

use super::AppState;
use crate::domain::order::Order;
use crate::messaging::PushEnvelope;
use crate::pipeline::PipelineError;

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// Handle one push delivery.
pub async fn push_handler(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, PipelineError> {
    let result = process_push(&state, &body).await;

    let status = match &result {
        Ok(_) => StatusCode::OK.as_u16(),
        Err(e) => e.http_status(),
    };
    if let Some(metrics) = &state.metrics {
        metrics.record_push_response(status);
    }

    let order = result?;
    Ok(HttpResponse::Ok().json(order))
}

async fn process_push(state: &AppState, body: &[u8]) -> Result<Order, PipelineError> {
    let envelope: PushEnvelope =
        serde_json::from_slice(body).map_err(|e| PipelineError::InvalidEnvelope(e.to_string()))?;

    if let Some(subscription) = &envelope.subscription {
        tracing::debug!(subscription = %subscription, "Push delivery received");
    }

    let message = envelope
        .into_message()
        .map_err(|e| PipelineError::InvalidEnvelope(format!("invalid base64 data: {e}")))?;

    tracing::debug!(
        message_id = %message.message_id,
        bytes = message.data.len(),
        "Decoded push payload"
    );

    state.pipeline.process_avro(&message.data).await
}

pub async fn health_handler(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "schema": state.pipeline.schema_name(),
    }))
}
