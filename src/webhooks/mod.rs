pub mod create;
pub mod delete;
pub mod dispatch;
pub mod github;
pub mod installation;
pub mod pull_request;
pub mod push;
pub mod signature;

pub use dispatch::{dispatch, AppHandlers, EventHandlers, HandlerOutcome};
pub use github::{process_delivery, WebhookEnvelope};
