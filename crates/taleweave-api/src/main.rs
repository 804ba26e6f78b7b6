//! Taleweave API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use taleweave_api::config::Config;
use taleweave_api::error::AppError;
use taleweave_api::state::AppState;
use taleweave_api::{build_router, cors_layer, telemetry};
use taleweave_llm::LlmClient;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let tracer_provider = telemetry::init_tracing(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Taleweave API server");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    taleweave_store::MIGRATOR.run(&pool).await?;
    tracing::info!("database migrations applied");

    let llm = LlmClient::new(config.llm.clone()).map_err(|e| AppError::Config(e.to_string()))?;
    let state = AppState::postgres(pool, Arc::new(llm), config.settings.clone());
    let app = build_router(state, cors_layer(config.cors_origins.as_deref())?);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            tracing::error!(error = %e, "tracer shutdown failed");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
