//! Errors returned by the GitHub repository gateway.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// The requested ref (or merge base/head) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// GitHub answered with an error status other than 404.
    #[error("GitHub API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GitHub API call timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS, serialization or client construction failures.
    #[error("GitHub transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }

    pub(crate) fn from_status(status: u16, message: String) -> Self {
        if status == 404 {
            GatewayError::NotFound(message)
        } else {
            GatewayError::Api { status, message }
        }
    }
}

impl From<octocrab::Error> for GatewayError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                GatewayError::from_status(source.status_code.as_u16(), source.message.clone())
            }
            other => GatewayError::Transport(other.to_string()),
        }
    }
}
