use tracing::info;

use crate::github::types::DeleteEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSummary {
    pub repository: String,
    pub actor: Option<String>,
    pub git_ref: String,
}

pub fn handle_delete_event(event: &DeleteEvent) -> DeleteSummary {
    let summary = DeleteSummary {
        repository: event.repository.full_name.clone(),
        actor: event.actor().map(str::to_string),
        git_ref: event.git_ref.clone(),
    };

    info!(
        "Received delete from {}, by user {}, on {:?} {}",
        summary.repository,
        summary.actor.as_deref().unwrap_or("unknown"),
        event.ref_type,
        summary.git_ref
    );

    summary
}
