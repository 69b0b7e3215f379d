use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use github_webhook_app::config::AppConfig;
use github_webhook_app::github::GitHubClient;
use github_webhook_app::server::{self, AppState};
use github_webhook_app::webhooks::AppHandlers;
use github_webhook_app::AppError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "github_webhook_app=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GitHub webhook app");

    let config = AppConfig::load().map_err(AppError::from)?;
    info!("Configuration loaded: {:?}", config.workflow);

    let gateway = GitHubClient::from_config(&config.github).map_err(AppError::from)?;
    info!("GitHub client initialized");

    let handlers = AppHandlers::new(Arc::new(gateway), config.workflow.clone());
    let state = AppState::new(config.webhook_secret.clone(), Arc::new(handlers));
    let app = server::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server_host, config.server_port
            )
        })?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::from)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::from)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
