use studygenie_service::config::StudyConfig;
use studygenie_service::services::metrics::init_metrics;
use studygenie_service::startup::Application;

use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = StudyConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("studygenie-service", "info", config.otlp_endpoint.as_deref());
    init_metrics();

    tracing::info!(
        provider = ?config.provider.kind,
        model = %config.provider.model,
        "Initializing StudyGenie"
    );

    let app = Application::build(config)
        .await
        .map_err(|e| anyhow::anyhow!("Startup error: {}", e))?;

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
