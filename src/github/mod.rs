pub mod client;
pub mod error;
pub mod gateway;
pub mod types;
pub mod webhooks;

pub use client::GitHubClient;
pub use error::GatewayError;
pub use gateway::{GitObject, GitRef, MergeOutcome, RepositoryGateway};
