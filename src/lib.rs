pub mod config;
pub mod error;
pub mod github;
pub mod server;
pub mod webhooks;

pub use error::{AppError, WebhookError};
