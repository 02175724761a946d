use crate::services::metrics::get_metrics;
use crate::startup::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use service_core::error::AppError;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {}

pub async fn index() -> impl IntoResponse {
    IndexTemplate {}
}

/// Liveness probe.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "studygenie-service",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.generator.provider_name()
    }))
}

/// Readiness probe: the provider must answer its health check.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    match state.generator.health_check().await {
        Ok(_) => Ok(StatusCode::OK),
        Err(e) => {
            tracing::warn!(
                provider = state.generator.provider_name(),
                reason = e.reason(),
                error = %e,
                "Provider not ready"
            );
            Err(AppError::ServiceUnavailable)
        }
    }
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        get_metrics(),
    )
}

pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Route not found"))
}
