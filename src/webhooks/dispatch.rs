//! Routes a decoded event to the one handler for its kind.
//!
//! [`EventHandlers`] has one method per [`EventKind`](crate::github::webhooks::EventKind),
//! and [`dispatch`] matches exhaustively, so adding a kind fails to compile
//! until a handler exists for it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::WorkflowConfig;
use crate::error::HandlerError;
use crate::github::gateway::RepositoryGateway;
use crate::github::types::{
    CreateEvent, DeleteEvent, InstallationEvent, PingEvent, PullRequestEvent, PushEvent,
};
use crate::github::webhooks::{EventKind, WebhookEvent};
use crate::webhooks::create::{self, CreateOutcome};
use crate::webhooks::delete::{self, DeleteSummary};
use crate::webhooks::push::{self, PushSummary};
use crate::webhooks::{installation, pull_request};

/// What a handler did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    Acknowledged(EventKind),
    Push(PushSummary),
    Delete(DeleteSummary),
    Create(CreateOutcome),
}

#[async_trait]
pub trait EventHandlers: Send + Sync {
    async fn installation(&self, event: &InstallationEvent) -> Result<HandlerOutcome, HandlerError>;
    async fn ping(&self, event: &PingEvent) -> Result<HandlerOutcome, HandlerError>;
    async fn push(&self, event: &PushEvent) -> Result<HandlerOutcome, HandlerError>;
    async fn pull_request(&self, event: &PullRequestEvent) -> Result<HandlerOutcome, HandlerError>;
    async fn delete(&self, event: &DeleteEvent) -> Result<HandlerOutcome, HandlerError>;
    async fn create(&self, event: &CreateEvent) -> Result<HandlerOutcome, HandlerError>;
}

/// Invokes exactly one handler and waits for it to finish.
pub async fn dispatch<H>(handlers: &H, event: &WebhookEvent) -> Result<HandlerOutcome, HandlerError>
where
    H: EventHandlers + ?Sized,
{
    match event {
        WebhookEvent::Installation(e) => handlers.installation(e).await,
        WebhookEvent::Ping(e) => handlers.ping(e).await,
        WebhookEvent::Push(e) => handlers.push(e).await,
        WebhookEvent::PullRequest(e) => handlers.pull_request(e).await,
        WebhookEvent::Delete(e) => handlers.delete(e).await,
        WebhookEvent::Create(e) => handlers.create(e).await,
    }
}

/// Production handler set.
pub struct AppHandlers {
    gateway: Arc<dyn RepositoryGateway>,
    workflow: WorkflowConfig,
}

impl AppHandlers {
    pub fn new(gateway: Arc<dyn RepositoryGateway>, workflow: WorkflowConfig) -> Self {
        Self { gateway, workflow }
    }
}

#[async_trait]
impl EventHandlers for AppHandlers {
    async fn installation(&self, event: &InstallationEvent) -> Result<HandlerOutcome, HandlerError> {
        installation::handle_installation_event(event);
        Ok(HandlerOutcome::Acknowledged(EventKind::Installation))
    }

    async fn ping(&self, event: &PingEvent) -> Result<HandlerOutcome, HandlerError> {
        installation::handle_ping_event(event);
        Ok(HandlerOutcome::Acknowledged(EventKind::Ping))
    }

    async fn push(&self, event: &PushEvent) -> Result<HandlerOutcome, HandlerError> {
        Ok(HandlerOutcome::Push(push::handle_push_event(event)))
    }

    async fn pull_request(&self, event: &PullRequestEvent) -> Result<HandlerOutcome, HandlerError> {
        pull_request::handle_pull_request_event(event);
        Ok(HandlerOutcome::Acknowledged(EventKind::PullRequest))
    }

    async fn delete(&self, event: &DeleteEvent) -> Result<HandlerOutcome, HandlerError> {
        Ok(HandlerOutcome::Delete(delete::handle_delete_event(event)))
    }

    async fn create(&self, event: &CreateEvent) -> Result<HandlerOutcome, HandlerError> {
        let outcome = create::handle_create_event(self.gateway.as_ref(), &self.workflow, event).await?;
        Ok(HandlerOutcome::Create(outcome))
    }
}
