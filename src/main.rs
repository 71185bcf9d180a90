use anyhow::{Context, Result};
use fuzzyserve::{api, config, logging, model};
use std::net::Ipv4Addr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::init_config().context("Failed to load configuration")?;
    logging::init_tracing();

    let handle = model::ModelHandle::new();
    let path = &config.model_path;
    let loaded = model::load_model(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;
    handle.install(loaded)?;

    let app = api::create_router(api::AppState::new(handle, config.build_version.as_str()));

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.server_port))?;
    tracing::info!("Listening on http://0.0.0.0:{}", config.server_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Cleaning up the resources on application shutdown");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
