use coffee_service::config::CoffeeConfig;
use coffee_service::services::init_metrics;
use coffee_service::Application;
use service_core::observability::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CoffeeConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "coffee-service",
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );

    // Must run before any metric is recorded.
    init_metrics()?;

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start coffee-service: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    tracing::info!(
        port = application.port(),
        version = env!("CARGO_PKG_VERSION"),
        "Server is running"
    );
    application.run_until_stopped().await?;

    shutdown_tracing();
    Ok(())
}
