#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use github_webhook_app::error::HandlerError;
use github_webhook_app::github::types::{
    CreateEvent, DeleteEvent, InstallationEvent, PingEvent, PullRequestEvent, PushEvent,
};
use github_webhook_app::github::webhooks::EventKind;
use github_webhook_app::github::{GatewayError, GitObject, GitRef, MergeOutcome, RepositoryGateway};
use github_webhook_app::webhooks::{EventHandlers, HandlerOutcome};
use serde_json::json;

pub const SECRET: &[u8] = b"It's a Secret to Everybody";

pub fn git_ref(name: &str, sha: &str) -> GitRef {
    GitRef {
        name: name.to_string(),
        object: GitObject {
            sha: sha.to_string(),
            kind: Some("commit".to_string()),
        },
    }
}

/// Gateway backed by an in-memory ref table, counting every call.
#[derive(Default)]
pub struct InMemoryGateway {
    refs: Mutex<HashMap<String, String>>,
    merges: Mutex<Vec<(String, String, String)>>,
    pub get_ref_calls: AtomicUsize,
    pub create_ref_calls: AtomicUsize,
    pub merge_calls: AtomicUsize,
}

impl InMemoryGateway {
    pub fn with_refs(refs: &[(&str, &str)]) -> Self {
        let gateway = Self::default();
        {
            let mut table = gateway.refs.lock().unwrap();
            for (name, sha) in refs {
                table.insert(name.to_string(), sha.to_string());
            }
        }
        gateway
    }

    pub fn sha_of(&self, name: &str) -> Option<String> {
        self.refs.lock().unwrap().get(name).cloned()
    }

    pub fn merges(&self) -> Vec<(String, String, String)> {
        self.merges.lock().unwrap().clone()
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositoryGateway for InMemoryGateway {
    async fn get_ref(&self, _owner: &str, _repo: &str, name: &str) -> Result<GitRef, GatewayError> {
        self.get_ref_calls.fetch_add(1, Ordering::SeqCst);
        self.refs
            .lock()
            .unwrap()
            .get(name)
            .map(|sha| git_ref(name, sha))
            .ok_or_else(|| GatewayError::NotFound(format!("{} not found", name)))
    }

    async fn create_ref(
        &self,
        _owner: &str,
        _repo: &str,
        name: &str,
        sha: &str,
    ) -> Result<GitRef, GatewayError> {
        self.create_ref_calls.fetch_add(1, Ordering::SeqCst);
        let mut refs = self.refs.lock().unwrap();
        if refs.contains_key(name) {
            return Err(GatewayError::Api {
                status: 422,
                message: "Reference already exists".to_string(),
            });
        }
        refs.insert(name.to_string(), sha.to_string());
        Ok(git_ref(name, sha))
    }

    async fn merge_branches(
        &self,
        _owner: &str,
        _repo: &str,
        base: &str,
        head: &str,
        commit_message: &str,
    ) -> Result<MergeOutcome, GatewayError> {
        self.merge_calls.fetch_add(1, Ordering::SeqCst);
        self.merges.lock().unwrap().push((
            base.to_string(),
            head.to_string(),
            commit_message.to_string(),
        ));
        Ok(MergeOutcome::AlreadyUpToDate)
    }
}

/// Handler set that only counts invocations per kind.
#[derive(Default)]
pub struct SpyHandlers {
    counts: Mutex<HashMap<EventKind, usize>>,
    pub fail: bool,
}

impl SpyHandlers {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.counts.lock().unwrap().get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.lock().unwrap().values().sum()
    }

    fn record(&self, kind: EventKind) -> Result<HandlerOutcome, HandlerError> {
        *self.counts.lock().unwrap().entry(kind).or_insert(0) += 1;
        if self.fail {
            Err(HandlerError::Failed(format!("{} handler failed", kind)))
        } else {
            Ok(HandlerOutcome::Acknowledged(kind))
        }
    }
}

#[async_trait]
impl EventHandlers for SpyHandlers {
    async fn installation(&self, _: &InstallationEvent) -> Result<HandlerOutcome, HandlerError> {
        self.record(EventKind::Installation)
    }

    async fn ping(&self, _: &PingEvent) -> Result<HandlerOutcome, HandlerError> {
        self.record(EventKind::Ping)
    }

    async fn push(&self, _: &PushEvent) -> Result<HandlerOutcome, HandlerError> {
        self.record(EventKind::Push)
    }

    async fn pull_request(&self, _: &PullRequestEvent) -> Result<HandlerOutcome, HandlerError> {
        self.record(EventKind::PullRequest)
    }

    async fn delete(&self, _: &DeleteEvent) -> Result<HandlerOutcome, HandlerError> {
        self.record(EventKind::Delete)
    }

    async fn create(&self, _: &CreateEvent) -> Result<HandlerOutcome, HandlerError> {
        self.record(EventKind::Create)
    }
}

pub fn repository() -> serde_json::Value {
    json!({
        "id": 35129377,
        "name": "public-repo",
        "full_name": "baxterthehacker/public-repo",
        "private": false,
        "owner": {
            "name": "baxterthehacker",
            "email": "baxterthehacker@users.noreply.github.com",
            "login": "baxterthehacker",
            "id": 6752317
        }
    })
}

/// A minimal valid payload for each event kind.
pub fn sample_payload(kind: EventKind) -> serde_json::Value {
    match kind {
        EventKind::Installation => json!({
            "action": "created",
            "installation": { "id": 27686641, "account": { "login": "baxterthehacker" } },
            "sender": { "login": "baxterthehacker" }
        }),
        EventKind::Ping => json!({
            "zen": "Design for failure.",
            "hook_id": 109948940,
            "repository": repository()
        }),
        EventKind::Push => json!({
            "ref": "refs/heads/main",
            "before": "9049f1265b7d61be4a8904a9a27120d2064dab3b",
            "after": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c",
            "repository": repository(),
            "pusher": { "name": "baxterthehacker", "email": "baxterthehacker@users.noreply.github.com" },
            "commits": [
                { "id": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c", "message": "Update README.md" }
            ]
        }),
        EventKind::PullRequest => json!({
            "action": "opened",
            "number": 1,
            "pull_request": { "title": "Update the README with new information" },
            "repository": repository()
        }),
        EventKind::Delete => json!({
            "ref": "simple-tag",
            "ref_type": "tag",
            "repository": repository(),
            "sender": { "login": "baxterthehacker" }
        }),
        EventKind::Create => json!({
            "ref": "feature-x",
            "ref_type": "branch",
            "master_branch": "main",
            "repository": repository(),
            "sender": { "login": "baxterthehacker" }
        }),
    }
}
