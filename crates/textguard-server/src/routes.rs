//! HTTP routes and handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use textguard_core::{Error, PredictionError, PredictionRequest, PredictionResponse};
use textguard_inference::ClassifierService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClassifierService>,
    pub metrics: PrometheusHandle,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/v1/predict", post(predict))
        .fallback(fallback)
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Response {
    if state.service.is_ready() {
        Json(json!({ "status": "healthy" })).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unready" })),
        )
            .into_response()
    }
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

/// Classification endpoint.
///
/// Request-shape violations (empty batch, more than 100 texts) are rejected
/// here and never reach the pipeline.
async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, ApiError> {
    metrics::counter!("textguard_requests_total").increment(1);

    request.validate()?;

    let started = Instant::now();
    let response = state.service.predict(request).await?;

    metrics::histogram!("textguard_prediction_latency_us")
        .record(started.elapsed().as_micros() as f64);
    metrics::counter!("textguard_predictions_total", "outcome" => "ok").increment(1);
    Ok(Json(response))
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling: maps pipeline failures to status codes.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        warn!(error = %err, "prediction request failed");
        metrics::counter!("textguard_predictions_total", "outcome" => "error").increment(1);
        let message = err.to_string();
        let mut mapped = ApiError::from(err.into_cause());
        mapped.message = message;
        mapped
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}
