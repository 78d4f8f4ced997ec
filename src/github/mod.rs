pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::{PrCommit, PullRequestRef};

use crate::error::FetchError;
use async_trait::async_trait;

/// Remote authority for the commits that make up a pull request.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn list_commits(&self, pr: &PullRequestRef) -> Result<Vec<PrCommit>, FetchError>;
}
