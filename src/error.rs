use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::github::error::GatewayError;
use crate::github::webhooks::PayloadError;
use crate::webhooks::create::CreateWorkflowError;

/// Errors raised while bootstrapping the application.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("GitHub client error: {0}")]
    GitHub(#[from] GatewayError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("GITHUB_WEBHOOK_SECRET must be set to a non-empty value")]
    MissingWebhookSecret,

    #[error("GitHub credentials missing: set GITHUB_TOKEN or GITHUB_APP_ID, GITHUB_PRIVATE_KEY_PATH and GITHUB_INSTALLATION_ID")]
    MissingCredentials,

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failure of a single event handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Create(#[from] CreateWorkflowError),

    /// Failure of a handler with no typed error of its own. The built-in
    /// handlers never produce it; it exists for custom [`EventHandlers`]
    /// implementations.
    ///
    /// [`EventHandlers`]: crate::webhooks::EventHandlers
    #[error("{0}")]
    Failed(String),
}

/// Terminal outcome of a webhook delivery that did not succeed.
///
/// Each variant maps to exactly one HTTP response.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Signature verification failed")]
    Unauthorized,

    #[error("Unsupported event: {0}")]
    UnsupportedEvent(String),

    #[error("Malformed payload: {0}")]
    Decode(#[from] PayloadError),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebhookError::UnsupportedEvent(_) => StatusCode::NOT_IMPLEMENTED,
            WebhookError::Decode(_) => StatusCode::BAD_REQUEST,
            WebhookError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            WebhookError::Unauthorized => status.into_response(),
            other => (
                status,
                Json(serde_json::json!({ "reason": other.to_string() })),
            )
                .into_response(),
        }
    }
}
