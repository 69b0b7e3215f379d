use tracing::info;

use crate::github::types::PushEvent;

/// What a push handler observed. Pushes trigger no remote calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSummary {
    pub repository: String,
    pub pusher: String,
    pub git_ref: String,
    pub commits: Vec<String>,
}

pub fn handle_push_event(event: &PushEvent) -> PushSummary {
    let summary = PushSummary {
        repository: event.repository.full_name.clone(),
        pusher: event.pusher.name.clone(),
        git_ref: event.git_ref.clone(),
        commits: event.commit_ids(),
    };

    info!(
        "Received push from {}, by user {}, on branch {}",
        summary.repository, summary.pusher, summary.git_ref
    );
    info!("Pushed commits: {:?}", summary.commits);

    summary
}
