use std::sync::Arc;
use std::time::Duration;

use derive_builder::Builder;

use crate::github::{Branch as GHBranch, PullRequest, Repository};
use crate::review::event::{IssueComment, PullRequestEvent, ReviewEvent};
use crate::review::{handle_review_event, HandledEvent, ReviewContext, WorkflowError};

mod client;
mod git;

pub use client::TestRepositoryClient;
pub use git::{GitOp, TestGit};

pub const DEFAULT_HEAD_REF: &str = "feature";
pub const DEFAULT_HEAD_SHA: &str = "sha-head";
pub const DEFAULT_BASE_SHA: &str = "sha-base";
/// HEAD of the local clone after a successful autosquash.
pub const SQUASHED_SHA: &str = "sha-squashed";

pub fn default_repo() -> Repository {
    Repository::new("owner", "name", "git@github.com:owner/name.git")
}

pub fn default_pr() -> PullRequest {
    PRBuilder::default().create()
}

/// A comment on the default pull request.
pub fn comment(body: &str) -> IssueComment {
    IssueComment {
        issue_number: default_pr().number,
        body: body.to_string(),
        is_pull_request: true,
        repository: default_repo(),
    }
}

pub fn pr_event(action: &str) -> PullRequestEvent {
    PullRequestEvent {
        issue_number: default_pr().number,
        action: action.to_string(),
        repository: default_repo(),
    }
}

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct PR {
    #[builder(default = "1")]
    number: u64,
    #[builder(default = "BranchBuilder::default().name(DEFAULT_HEAD_REF.to_string()).sha(DEFAULT_HEAD_SHA.to_string())")]
    head: BranchBuilder,
    #[builder(default = "BranchBuilder::default().name(\"main\".to_string()).sha(DEFAULT_BASE_SHA.to_string())")]
    base: BranchBuilder,
}

impl PRBuilder {
    pub fn create(self) -> PullRequest {
        let PR { number, head, base } = self.build().unwrap();
        PullRequest {
            number: number.into(),
            head: head.create(),
            base: base.create(),
        }
    }
}

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Branch {
    #[builder(default)]
    name: String,
    #[builder(default)]
    sha: String,
}

impl BranchBuilder {
    pub fn create(self) -> GHBranch {
        let Branch { name, sha } = self.build().unwrap();
        GHBranch {
            name,
            sha: sha.into(),
        }
    }
}

/// Review context backed by in-memory collaborators.
/// The default pull request of the default repository is known to the client.
pub struct TestContext {
    pub client: Arc<TestRepositoryClient>,
    pub git: Arc<TestGit>,
    ctx: ReviewContext,
}

impl TestContext {
    pub async fn handle(&self, event: ReviewEvent) -> Result<HandledEvent, WorkflowError> {
        handle_review_event(&self.ctx, event).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        let client = Arc::new(TestRepositoryClient::default());
        let git = Arc::new(TestGit::default());
        let ctx = ReviewContext::new(client.clone(), git.clone(), Duration::from_secs(60));
        Self { client, git, ctx }
    }
}
