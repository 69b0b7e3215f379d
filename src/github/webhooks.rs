use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::github::types::{
    CreateEvent, DeleteEvent, InstallationEvent, PingEvent, PullRequestEvent, PushEvent,
};

/// The webhook event kinds this app handles, keyed by the `X-GitHub-Event` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Installation,
    Ping,
    Push,
    PullRequest,
    Delete,
    Create,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Installation,
        EventKind::Ping,
        EventKind::Push,
        EventKind::PullRequest,
        EventKind::Delete,
        EventKind::Create,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Installation => "installation",
            EventKind::Ping => "ping",
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
            EventKind::Delete => "delete",
            EventKind::Create => "create",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported event: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// A webhook payload decoded against the schema of its declared kind.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    Installation(InstallationEvent),
    Ping(PingEvent),
    Push(PushEvent),
    PullRequest(PullRequestEvent),
    Delete(DeleteEvent),
    Create(CreateEvent),
}

impl WebhookEvent {
    pub fn decode(kind: EventKind, payload: &[u8]) -> Result<Self, PayloadError> {
        let event = match kind {
            EventKind::Installation => WebhookEvent::Installation(parse(payload)?),
            EventKind::Ping => WebhookEvent::Ping(parse(payload)?),
            EventKind::Push => WebhookEvent::Push(parse(payload)?),
            EventKind::PullRequest => WebhookEvent::PullRequest(parse(payload)?),
            EventKind::Delete => WebhookEvent::Delete(parse(payload)?),
            EventKind::Create => {
                let event: CreateEvent = parse(payload)?;
                // The branch workflow addresses the repository by owner and name.
                if event.repository.coordinates().is_none() {
                    return Err(PayloadError::MissingField("repository.owner.login/repository.name"));
                }
                WebhookEvent::Create(event)
            }
        };

        Ok(event)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            WebhookEvent::Installation(_) => EventKind::Installation,
            WebhookEvent::Ping(_) => EventKind::Ping,
            WebhookEvent::Push(_) => EventKind::Push,
            WebhookEvent::PullRequest(_) => EventKind::PullRequest,
            WebhookEvent::Delete(_) => EventKind::Delete,
            WebhookEvent::Create(_) => EventKind::Create,
        }
    }
}

fn parse<T: DeserializeOwned>(payload: &[u8]) -> Result<T, PayloadError> {
    Ok(serde_json::from_slice(payload)?)
}
