use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    response::Json,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::WebhookSecret;
use crate::webhooks::{self, EventHandlers};

/// GitHub caps webhook payloads at 25 MB.
const MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub secret: WebhookSecret,
    pub handlers: Arc<dyn EventHandlers>,
}

impl AppState {
    pub fn new(secret: WebhookSecret, handlers: Arc<dyn EventHandlers>) -> Self {
        Self { secret, handlers }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhooks/github", post(webhooks::github::handle_webhook))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
                .into_inner(),
        )
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "github-webhook-app",
        "timestamp": chrono::Utc::now()
    }))
}
