use std::sync::Arc;
use std::time::Duration;

use axum::async_trait;

use crate::github::{Commit, CommitSha, GithubRepoName, PullRequest, PullRequestNumber, Repository};

pub mod command;
pub mod event;
pub mod gitops;
mod handlers;
pub mod locks;
pub mod status;

pub use command::{classify, ReviewCommand};
pub use handlers::{handle_review_event, HandledEvent, SquashOutcome, WorkflowError};
pub use locks::RepositoryLocks;
pub use status::{CommitStatus, PublishError, StatusContext, StatusState};

/// Provides access to the remote platform API.
/// It is behind a trait to allow easier mocking in tests.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Resolve a pull request by its number.
    async fn get_pull_request(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
    ) -> anyhow::Result<PullRequest>;

    /// List all commits of the given pull request, oldest first.
    async fn get_pull_request_commits(
        &self,
        repo: &GithubRepoName,
        pr: PullRequestNumber,
    ) -> anyhow::Result<Vec<Commit>>;

    /// Create a commit status. A status with the same context supersedes the previous one.
    async fn create_status(
        &self,
        repo: &GithubRepoName,
        sha: &CommitSha,
        status: &CommitStatus,
    ) -> anyhow::Result<()>;
}

/// Manages local clones of remote repositories.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Returns an up-to-date local clone of `repo`, cloning it first if it is not present yet.
    async fn get_updated_repo(&self, repo: &Repository) -> anyhow::Result<Box<dyn LocalRepo>>;
}

/// A local clone of a repository.
#[async_trait]
pub trait LocalRepo: Send + Sync {
    /// Rebase `head` onto `base` with autosquash, folding all fixup/squash commits.
    async fn rebase_autosquash(&self, base: &CommitSha, head: &CommitSha) -> anyhow::Result<()>;

    /// Force push the current HEAD to the remote branch `branch`.
    async fn force_push_head_to(&self, branch: &str) -> anyhow::Result<()>;

    async fn get_head_sha(&self) -> anyhow::Result<CommitSha>;
}

/// Everything the event handlers need to talk to the outside world.
pub struct ReviewContext {
    pub client: Arc<dyn RepositoryClient>,
    pub git: Arc<dyn GitClient>,
    pub locks: RepositoryLocks,
    request_timeout: Duration,
}

impl ReviewContext {
    pub fn new(
        client: Arc<dyn RepositoryClient>,
        git: Arc<dyn GitClient>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            git,
            locks: RepositoryLocks::default(),
            request_timeout,
        }
    }

    /// Upper bound for handling a single webhook event.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
