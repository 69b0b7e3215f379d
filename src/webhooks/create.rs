//! Create-event workflow.
//!
//! When a branch is created, the app makes sure a staging ("working") branch
//! exists and then merges the target branch into the new branch:
//!
//! 1. resolve `refs/heads/<new branch>`; abort if it cannot be resolved
//! 2. look up `refs/heads/<working branch>` and create it at the new branch's
//!    head if it is missing; an existing working branch is reused untouched
//! 3. merge `<target branch>` into the new branch and report the outcome
//!
//! A create event for the working branch itself (GitHub sends one after step
//! 2 creates it) is acknowledged without any API call, so the working branch
//! is never merged into.
//!
//! The three calls are not transactional. If the merge fails after the working
//! branch was created, the branch stays behind and the error says so
//! ([`CreateWorkflowError::MergeFailed`] with [`WorkingBranch::Created`]).

use thiserror::Error;
use tracing::{info, warn};

use crate::config::WorkflowConfig;
use crate::github::error::GatewayError;
use crate::github::gateway::{MergeOutcome, RepositoryGateway};
use crate::github::types::CreateEvent;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

fn branch_ref(branch: &str) -> String {
    format!("{}{}", BRANCH_REF_PREFIX, branch)
}

/// Whether this run created the working branch or found it already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingBranch {
    Created,
    Reused,
}

#[derive(Error, Debug)]
pub enum CreateWorkflowError {
    #[error("missing required field `{0}` in create event")]
    MissingField(&'static str),

    #[error("failed to resolve base branch {branch}: {source}")]
    BaseRef {
        branch: String,
        #[source]
        source: GatewayError,
    },

    #[error("failed to look up working branch {branch}: {source}")]
    WorkingBranchLookup {
        branch: String,
        #[source]
        source: GatewayError,
    },

    #[error("failed to create working branch {branch}: {source}")]
    WorkingBranchCreate {
        branch: String,
        #[source]
        source: GatewayError,
    },

    #[error("merge failed (working branch {working_branch:?}): {source}")]
    MergeFailed {
        working_branch: WorkingBranch,
        #[source]
        source: GatewayError,
    },
}

/// Working state of one workflow run.
#[derive(Debug, Clone)]
pub struct RefOperationContext<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub base_branch: &'a str,
    pub working_branch: &'a str,
    pub target_branch: &'a str,
    pub commit_message: &'a str,
}

impl<'a> RefOperationContext<'a> {
    pub fn from_event(
        event: &'a CreateEvent,
        workflow: &'a WorkflowConfig,
    ) -> Result<Self, CreateWorkflowError> {
        let (owner, repo) = event
            .repository
            .coordinates()
            .ok_or(CreateWorkflowError::MissingField("repository.owner.login"))?;

        Ok(Self {
            owner,
            repo,
            base_branch: event
                .git_ref
                .strip_prefix(BRANCH_REF_PREFIX)
                .unwrap_or(&event.git_ref),
            working_branch: &workflow.working_branch,
            target_branch: &workflow.target_branch,
            commit_message: &workflow.commit_message,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub base_branch: String,
    pub base_sha: String,
    pub working_branch: String,
    pub working_branch_state: WorkingBranch,
    pub merge: MergeOutcome,
}

/// Result of handling one create event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The workflow ran to completion.
    Synced(CreateReport),
    /// The created branch is the working branch; nothing was touched.
    WorkingBranchIgnored { branch: String },
}

impl CreateOutcome {
    pub fn report(&self) -> Option<&CreateReport> {
        match self {
            CreateOutcome::Synced(report) => Some(report),
            CreateOutcome::WorkingBranchIgnored { .. } => None,
        }
    }
}

pub async fn handle_create_event(
    gateway: &dyn RepositoryGateway,
    workflow: &WorkflowConfig,
    event: &CreateEvent,
) -> Result<CreateOutcome, CreateWorkflowError> {
    info!(
        "Received {:?} {} in {}",
        event.ref_type, event.git_ref, event.repository.full_name
    );

    let ctx = RefOperationContext::from_event(event, workflow)?;
    if ctx.base_branch == ctx.working_branch {
        info!(
            "Ignoring creation of working branch {} in {}/{}",
            ctx.working_branch, ctx.owner, ctx.repo
        );
        return Ok(CreateOutcome::WorkingBranchIgnored {
            branch: ctx.working_branch.to_string(),
        });
    }

    run_workflow(gateway, &ctx).await.map(CreateOutcome::Synced)
}

pub async fn run_workflow(
    gateway: &dyn RepositoryGateway,
    ctx: &RefOperationContext<'_>,
) -> Result<CreateReport, CreateWorkflowError> {
    let base_ref = gateway
        .get_ref(ctx.owner, ctx.repo, &branch_ref(ctx.base_branch))
        .await
        .map_err(|source| CreateWorkflowError::BaseRef {
            branch: ctx.base_branch.to_string(),
            source,
        })?;
    let base_sha = base_ref.sha().to_string();
    info!("Base branch {} is at {}", ctx.base_branch, base_sha);

    let working_ref = branch_ref(ctx.working_branch);
    let working_branch_state = match gateway.get_ref(ctx.owner, ctx.repo, &working_ref).await {
        Ok(existing) => {
            info!(
                "Reusing working branch {} at {}",
                ctx.working_branch,
                existing.sha()
            );
            WorkingBranch::Reused
        }
        Err(GatewayError::NotFound(_)) => {
            gateway
                .create_ref(ctx.owner, ctx.repo, &working_ref, &base_sha)
                .await
                .map_err(|source| CreateWorkflowError::WorkingBranchCreate {
                    branch: ctx.working_branch.to_string(),
                    source,
                })?;
            info!("Created working branch {} at {}", ctx.working_branch, base_sha);
            WorkingBranch::Created
        }
        Err(source) => {
            return Err(CreateWorkflowError::WorkingBranchLookup {
                branch: ctx.working_branch.to_string(),
                source,
            })
        }
    };

    let merge = gateway
        .merge_branches(
            ctx.owner,
            ctx.repo,
            ctx.base_branch,
            ctx.target_branch,
            ctx.commit_message,
        )
        .await
        .map_err(|source| {
            if working_branch_state == WorkingBranch::Created {
                warn!(
                    "Working branch {} was created but the merge failed",
                    ctx.working_branch
                );
            }
            CreateWorkflowError::MergeFailed {
                working_branch: working_branch_state,
                source,
            }
        })?;

    match &merge {
        MergeOutcome::Merged { sha } => info!(
            "Merged {} into {} as {}",
            ctx.target_branch, ctx.base_branch, sha
        ),
        MergeOutcome::AlreadyUpToDate => info!(
            "{} already contains {}; nothing to merge",
            ctx.base_branch, ctx.target_branch
        ),
        MergeOutcome::Conflict { message } => warn!(
            "Merging {} into {} conflicts: {}",
            ctx.target_branch, ctx.base_branch, message
        ),
    }

    Ok(CreateReport {
        base_branch: ctx.base_branch.to_string(),
        base_sha,
        working_branch: ctx.working_branch.to_string(),
        working_branch_state,
        merge,
    })
}
