use tracing::info;

use crate::github::types::PullRequestEvent;

/// Acknowledges a pull request event. Reserved for future PR workflows.
pub fn handle_pull_request_event(event: &PullRequestEvent) {
    let repo_name = event
        .repository
        .as_ref()
        .map(|r| r.full_name.as_str())
        .unwrap_or("unknown");

    let title = event
        .pull_request
        .as_ref()
        .and_then(|pr| pr.title.as_deref())
        .unwrap_or("");

    info!(
        "Pull request #{} {} in {}: {}",
        event.number, event.action, repo_name, title
    );
}
