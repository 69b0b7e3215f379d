use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use octocrab::models::{AppId, InstallationId};
use octocrab::Octocrab;
use tracing::{debug, info};

use crate::config::{GitHubAuth, GitHubConfig};
use crate::github::error::GatewayError;
use crate::github::gateway::{GitRef, MergeOutcome, RepositoryGateway};

/// Octocrab-backed [`RepositoryGateway`]. Every call is bounded by `timeout`.
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
    timeout: Duration,
}

impl GitHubClient {
    pub fn new(client: Octocrab, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_config(config: &GitHubConfig) -> Result<Self, GatewayError> {
        let mut builder = Octocrab::builder();
        if let Some(api_url) = &config.api_url {
            builder = builder.base_uri(api_url.as_str())?;
        }

        let client = match &config.auth {
            GitHubAuth::Token(token) => {
                info!("Authenticating to GitHub with a token");
                builder.personal_token(token.clone()).build()?
            }
            GitHubAuth::App {
                app_id,
                private_key_path,
                installation_id,
            } => {
                info!(
                    "Authenticating to GitHub as app {} (installation {})",
                    app_id, installation_id
                );
                let pem = std::fs::read(private_key_path).map_err(|e| {
                    GatewayError::Transport(format!("Failed to read private key: {}", e))
                })?;
                let key = jsonwebtoken::EncodingKey::from_rsa_pem(&pem).map_err(|e| {
                    GatewayError::Transport(format!("Invalid private key: {}", e))
                })?;

                builder
                    .app(AppId(*app_id), key)
                    .build()?
                    .installation(InstallationId(*installation_id))
            }
        };

        Ok(Self::new(client, config.timeout))
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))?
    }

    async fn merge_request(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
        commit_message: &str,
    ) -> Result<MergeOutcome, GatewayError> {
        let route = format!("/repos/{}/{}/merges", owner, repo);
        let body = serde_json::json!({
            "base": base,
            "head": head,
            "commit_message": commit_message,
        });

        let response = self.client._post(route.as_str(), Some(&body)).await?;
        let status = response.status().as_u16();
        let text = self.client.body_to_string(response).await?;

        match status {
            201 => {
                let commit: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|e| GatewayError::Transport(format!("Invalid merge response: {}", e)))?;
                let sha = commit
                    .get("sha")
                    .and_then(|s| s.as_str())
                    .ok_or_else(|| GatewayError::Transport("Merge response has no sha".to_string()))?;
                Ok(MergeOutcome::Merged {
                    sha: sha.to_string(),
                })
            }
            204 => Ok(MergeOutcome::AlreadyUpToDate),
            409 => Ok(MergeOutcome::Conflict {
                message: error_message(&text),
            }),
            other => Err(GatewayError::from_status(other, error_message(&text))),
        }
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Pulls `message` out of a GitHub error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// `refs/heads/main` is addressed as `heads/main` in the Git refs API.
fn ref_path(git_ref: &str) -> &str {
    git_ref.strip_prefix("refs/").unwrap_or(git_ref)
}

#[async_trait]
impl RepositoryGateway for GitHubClient {
    async fn get_ref(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<GitRef, GatewayError> {
        debug!("Fetching ref {} in {}/{}", git_ref, owner, repo);
        let route = format!("/repos/{}/{}/git/ref/{}", owner, repo, ref_path(git_ref));
        self.bounded(async {
            let found: GitRef = self.client.get(&route, None::<&()>).await?;
            Ok::<_, GatewayError>(found)
        })
        .await
    }

    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        sha: &str,
    ) -> Result<GitRef, GatewayError> {
        debug!("Creating ref {} at {} in {}/{}", git_ref, sha, owner, repo);
        let route = format!("/repos/{}/{}/git/refs", owner, repo);
        let body = serde_json::json!({ "ref": git_ref, "sha": sha });
        self.bounded(async {
            let created: GitRef = self.client.post(&route, Some(&body)).await?;
            Ok::<_, GatewayError>(created)
        })
        .await
    }

    async fn merge_branches(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
        commit_message: &str,
    ) -> Result<MergeOutcome, GatewayError> {
        debug!("Merging {} into {} in {}/{}", head, base, owner, repo);
        self.bounded(self.merge_request(owner, repo, base, head, commit_message))
            .await
    }
}
