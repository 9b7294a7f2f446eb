//! Admin API server for the dermo-cosmetics storefront

use backoffice::error::BoxError;
use backoffice::{AppState, Config, api, utils};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    let _log_guard = utils::init_logger(config.log_dir.as_deref());
    if config.missing_service_key() {
        tracing::warn!("BACKEND_SERVICE_KEY not set, using an empty value");
    }

    tracing::info!("Starting backoffice (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = api::build_app(&state).with_state(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("backoffice HTTP listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("backoffice stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
