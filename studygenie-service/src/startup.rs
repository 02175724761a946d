//! Application startup and lifecycle management.
//!
//! The generation backend is built once here and handed to every request
//! through [`AppState`]; nothing else holds model state.

use crate::config::{StatusPolicy, StudyConfig};
use crate::handlers::{
    app::{health_check, index, metrics, not_found, readiness_check},
    study::{exam_tips, explain, flashcard, quiz, summarize},
};
use crate::middleware::metrics_middleware;
use crate::services::providers::{self, TextProvider};
use crate::services::Generator;
use axum::{
    body::Body,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, request_span};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub generator: Generator,
    pub status_policy: StatusPolicy,
}

impl AppState {
    pub fn new(generator: Generator, status_policy: StatusPolicy) -> Self {
        Self {
            generator,
            status_policy,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/explain", post(explain))
        .route("/flashcard", post(flashcard))
        .route("/summarize", post(summarize))
        .route("/exam_tips", post(exam_tips))
        .route("/quiz", post(quiz))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the provider selected in `config`.
    pub async fn build(config: StudyConfig) -> Result<Self, AppError> {
        let provider = providers::from_config(&config.provider).map_err(|e| {
            tracing::error!("Failed to initialize text provider: {}", e);
            AppError::ConfigError(e.into())
        })?;

        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: StudyConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        let generator = Generator::new(provider);

        match generator.health_check().await {
            Ok(()) => tracing::info!(
                provider = generator.provider_name(),
                model = %config.provider.model,
                "Text provider ready"
            ),
            Err(e) => tracing::warn!(
                provider = generator.provider_name(),
                model = %config.provider.model,
                error = %e,
                "Text provider not reachable at startup"
            ),
        }

        let state = AppState::new(generator, config.status_policy);

        // Port 0 = random port for testing
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            status_policy = ?config.status_policy,
            "StudyGenie service listening on port {}",
            port
        );

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
