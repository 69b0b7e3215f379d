use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::ConfigError;

/// Shared secret used to sign webhook deliveries. Never printed.
#[derive(Clone)]
pub struct WebhookSecret(Arc<[u8]>);

impl WebhookSecret {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self(Arc::from(secret.as_ref()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret(<redacted>)")
    }
}

#[derive(Clone)]
pub enum GitHubAuth {
    /// Personal access token or pre-minted installation token.
    Token(String),
    /// GitHub App credentials, exchanged for installation tokens by octocrab.
    App {
        app_id: u64,
        private_key_path: PathBuf,
        installation_id: u64,
    },
}

impl fmt::Debug for GitHubAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitHubAuth::Token(_) => f.write_str("Token(<redacted>)"),
            GitHubAuth::App {
                app_id,
                private_key_path,
                installation_id,
            } => f
                .debug_struct("App")
                .field("app_id", app_id)
                .field("private_key_path", private_key_path)
                .field("installation_id", installation_id)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub auth: GitHubAuth,
    pub api_url: Option<String>,
    pub timeout: Duration,
}

/// Branch names and message used by the create-event workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Staging branch created from the new branch when it does not exist yet.
    pub working_branch: String,
    /// Branch merged into the newly created branch.
    pub target_branch: String,
    pub commit_message: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            working_branch: "PREV".to_string(),
            target_branch: "main".to_string(),
            commit_message: "commit".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub webhook_secret: WebhookSecret,
    pub github: GitHubConfig,
    pub workflow: WorkflowConfig,
    pub server_host: String,
    pub server_port: u16,
}

#[derive(Deserialize)]
struct RawConfig {
    github_webhook_secret: Option<String>,
    github_token: Option<String>,
    github_app_id: Option<u64>,
    github_private_key_path: Option<String>,
    github_installation_id: Option<u64>,
    github_api_url: Option<String>,
    github_timeout_secs: u64,
    server_host: String,
    server_port: u16,
    working_branch: String,
    target_branch: String,
    merge_commit_message: String,
}

impl AppConfig {
    /// Loads configuration from an optional `config.toml` and the environment,
    /// environment taking precedence.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.toml")
    }

    /// Like [`AppConfig::load`], reading the optional file at `path`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let workflow = WorkflowConfig::default();
        Ok(Config::builder()
            .set_default("github_timeout_secs", 10_i64)?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 3000_i64)?
            .set_default("working_branch", workflow.working_branch)?
            .set_default("target_branch", workflow.target_branch)?
            .set_default("merge_commit_message", workflow.commit_message)?)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let raw: RawConfig = config.try_deserialize()?;

        let webhook_secret = raw
            .github_webhook_secret
            .filter(|s| !s.is_empty())
            .map(WebhookSecret::new)
            .ok_or(ConfigError::MissingWebhookSecret)?;

        let auth = match (
            raw.github_token.filter(|t| !t.is_empty()),
            raw.github_app_id,
            raw.github_private_key_path,
            raw.github_installation_id,
        ) {
            (Some(token), _, _, _) => GitHubAuth::Token(token),
            (None, Some(app_id), Some(private_key_path), Some(installation_id)) => GitHubAuth::App {
                app_id,
                private_key_path: PathBuf::from(private_key_path),
                installation_id,
            },
            _ => return Err(ConfigError::MissingCredentials),
        };

        if raw.github_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "github_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        for (key, value) in [
            ("working_branch", &raw.working_branch),
            ("target_branch", &raw.target_branch),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "branch name must not be empty".to_string(),
                });
            }
        }
        if raw.working_branch == raw.target_branch {
            return Err(ConfigError::Invalid {
                key: "working_branch",
                reason: "must differ from target_branch".to_string(),
            });
        }

        Ok(AppConfig {
            webhook_secret,
            github: GitHubConfig {
                auth,
                api_url: raw.github_api_url.filter(|u| !u.is_empty()),
                timeout: Duration::from_secs(raw.github_timeout_secs),
            },
            workflow: WorkflowConfig {
                working_branch: raw.working_branch,
                target_branch: raw.target_branch,
                commit_message: raw.merge_commit_message,
            },
            server_host: raw.server_host,
            server_port: raw.server_port,
        })
    }
}
