//! Sous API Server
//!
//! Serves the ingredient labeling page and JSON API.
//!
//! Author: sous maintainers

use sous_api::{create_router, state::AppState};
use sous_core::config::AppConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sous_api={level},sous_tagger={level},sous_graph={level},tower_http=info",
            level = config.logging.level
        ))
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let addr = config.bind_addr();

    let state = Arc::new(AppState::from_config(config).await?);
    tracing::info!(
        "Using {} record store and {} predictor",
        state.store.name(),
        state.predictor.name()
    );

    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Sous API Server starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    // Readiness fails while in-flight requests drain
    state.set_ready(false);
    tracing::info!("Shutdown requested, no longer ready");
}
