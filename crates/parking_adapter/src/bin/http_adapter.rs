#![forbid(unsafe_code)]

use parking_adapter::{http, AdapterConfig, ParkingAdapterRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = AdapterConfig::default_from_env()?;
    let runtime = ParkingAdapterRuntime::from_config(&config)?;
    let app = http::router(runtime, &config.cors_origins);

    info!(
        bind = %config.bind,
        slots = config.registry.slot_ids.len(),
        history_default_limit = config.service.history_default_limit,
        history_max_entries = ?config.registry.history_max_entries,
        "parking_adapter_http listening"
    );
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("parking_adapter_http stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable; serving until killed");
        std::future::pending::<()>().await;
    }
}
