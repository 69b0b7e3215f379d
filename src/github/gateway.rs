//! The slice of the GitHub API the branch workflow depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::github::error::GatewayError;

/// A Git reference as returned by `GET /repos/{owner}/{repo}/git/ref/{ref}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitObject {
    pub sha: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl GitRef {
    pub fn sha(&self) -> &str {
        &self.object.sha
    }
}

/// Result of `POST /repos/{owner}/{repo}/merges`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A merge commit was created.
    Merged { sha: String },
    /// `base` already contains `head`; nothing to merge.
    AlreadyUpToDate,
    /// GitHub refused the merge because of conflicting changes.
    Conflict { message: String },
}

#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    /// Looks up a fully qualified ref such as `refs/heads/main`.
    ///
    /// Returns [`GatewayError::NotFound`] when the ref does not exist.
    async fn get_ref(&self, owner: &str, repo: &str, git_ref: &str)
        -> Result<GitRef, GatewayError>;

    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        sha: &str,
    ) -> Result<GitRef, GatewayError>;

    /// Merges `head` into `base`.
    async fn merge_branches(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
        commit_message: &str,
    ) -> Result<MergeOutcome, GatewayError>;
}
