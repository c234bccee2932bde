//! boxoffice-server - box-office prediction service
//!
//! Loads the model manifest once at startup and serves predictions over
//! HTTP. Startup fails if any artifact cannot be loaded.

use anyhow::{Context, Result};
use boxoffice_lib::{health::HealthRegistry, MoviePredictor, StructuredLogger};
use boxoffice_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting boxoffice-server");

    let config = ServerConfig::load()?;
    info!(manifest = ?config.manifest, addr = %config.listen_addr(), "Server configured");

    let logger = StructuredLogger::new("server");
    let health_registry = HealthRegistry::new();

    let predictor = match MoviePredictor::from_manifest(&config.manifest) {
        Ok(predictor) => predictor,
        Err(e) => {
            error!(error = %e, manifest = ?config.manifest, "Failed to load model artifacts");
            return Err(e).context("Model artifacts could not be loaded");
        }
    };
    health_registry.set_model_loaded(Ok(())).await;
    logger.log_startup(SERVICE_VERSION, predictor.version());

    let state = Arc::new(api::AppState::new(Arc::new(predictor), health_registry));
    let router = api::create_router(state, config.max_body_bytes);

    let shutdown_logger = logger.clone();
    api::serve(&config.listen_addr(), router, async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        shutdown_logger.log_shutdown("SIGINT received");
    })
    .await?;

    info!("Shut down");
    Ok(())
}
