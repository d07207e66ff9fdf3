//! Commit statuses published by the bot.
use std::fmt::{Display, Formatter};

use crate::github::{CommitSha, GithubRepoName};
use crate::review::RepositoryClient;

/// Independent status tracks. A status write only supersedes earlier statuses with the same
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusContext {
    Squash,
    PeerReview,
}

impl StatusContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusContext::Squash => "review/squash",
            StatusContext::PeerReview => "review/peer",
        }
    }
}

impl Display for StatusContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
}

impl StatusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusState::Pending => "pending",
            StatusState::Success => "success",
            StatusState::Failure => "failure",
        }
    }
}

impl Display for StatusState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitStatus {
    pub context: StatusContext,
    pub state: StatusState,
    pub description: String,
}

impl CommitStatus {
    pub fn squash(state: StatusState, description: &str) -> Self {
        Self {
            context: StatusContext::Squash,
            state,
            description: description.to_string(),
        }
    }

    pub fn peer_review(state: StatusState, description: &str) -> Self {
        Self {
            context: StatusContext::PeerReview,
            state,
            description: description.to_string(),
        }
    }
}

/// Creating a commit status on the remote platform has failed.
#[derive(Debug, thiserror::Error)]
#[error("Failed to create a {state} status for commit {sha}")]
pub struct PublishError {
    pub repository: GithubRepoName,
    pub sha: CommitSha,
    pub state: StatusState,
    pub cause: anyhow::Error,
}

/// Publishes `status` on commit `sha` of `repo`.
///
/// The write is unconditional; the platform keeps the last status written for each context.
pub async fn publish_status(
    client: &dyn RepositoryClient,
    repo: &GithubRepoName,
    sha: &CommitSha,
    status: &CommitStatus,
) -> Result<(), PublishError> {
    tracing::debug!(
        "Setting {} status `{}` on {repo}@{sha}",
        status.context,
        status.state
    );
    client
        .create_status(repo, sha, status)
        .await
        .map_err(|cause| PublishError {
            repository: repo.clone(),
            sha: sha.clone(),
            state: status.state,
            cause,
        })
}
