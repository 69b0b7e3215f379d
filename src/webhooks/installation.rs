use tracing::info;

use crate::github::types::{InstallationEvent, PingEvent};

pub fn handle_installation_event(event: &InstallationEvent) {
    let account = event
        .installation
        .account
        .as_ref()
        .map(|a| a.login.as_str())
        .unwrap_or("unknown");

    info!(
        "Installation {} {} for {}",
        event.installation.id, event.action, account
    );
}

/// GitHub sends a ping when a webhook is first configured.
pub fn handle_ping_event(event: &PingEvent) {
    info!(
        "Ping from hook {}: {}",
        event
            .hook_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        event.zen.as_deref().unwrap_or("")
    );
}
