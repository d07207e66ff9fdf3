use crate::github::{CommitSha, Issue, PullRequest};
use crate::review::handlers::{get_pull_request, WorkflowError};
use crate::review::status::{publish_status, CommitStatus, StatusState};
use crate::review::ReviewContext;

const SQUASH_FAILED: &str =
    "Failed to automatically squash the fixup! and squash! commits. Please squash manually";
const SQUASH_SUCCEEDED: &str = "All fixup! and squash! commits successfully squashed";

#[derive(Debug, PartialEq)]
pub enum SquashOutcome {
    /// The branch was rewritten and pushed, `head` is the new head commit.
    Squashed { head: CommitSha },
    /// The commits could not be autosquashed, a failure status was published.
    ReportedFailure,
}

enum LocalSquash {
    Pushed(CommitSha),
    RebaseFailed(anyhow::Error),
}

pub(super) async fn command_squash(
    ctx: &ReviewContext,
    issue: &Issue,
) -> Result<SquashOutcome, WorkflowError> {
    let pr = get_pull_request(ctx, issue).await?;
    tracing::info!(
        "Squashing {} that's going to be merged into {}",
        pr.head.name,
        pr.base.name
    );

    let repo = &issue.repository;
    match squash_locally(ctx, issue, &pr).await? {
        LocalSquash::RebaseFailed(error) => {
            tracing::info!(
                "Failed to autosquash the commits with an interactive rebase: {error:?}. Setting a failure status."
            );
            let status = CommitStatus::squash(StatusState::Failure, SQUASH_FAILED);
            publish_status(ctx.client.as_ref(), &repo.name, &pr.head.sha, &status).await?;
            Ok(SquashOutcome::ReportedFailure)
        }
        LocalSquash::Pushed(head) => {
            let status = CommitStatus::squash(StatusState::Success, SQUASH_SUCCEEDED);
            publish_status(ctx.client.as_ref(), &repo.name, &head, &status).await?;
            Ok(SquashOutcome::Squashed { head })
        }
    }
}

/// Rewrites and pushes the PR branch while holding the lock of the repository's local clone.
async fn squash_locally(
    ctx: &ReviewContext,
    issue: &Issue,
    pr: &PullRequest,
) -> Result<LocalSquash, WorkflowError> {
    let _guard = ctx.locks.lock(&issue.repository.name).await;

    let local = ctx
        .git
        .get_updated_repo(&issue.repository)
        .await
        .map_err(|error| WorkflowError::local_repo("Failed to update the local repo", error))?;
    if let Err(error) = local.rebase_autosquash(&pr.base.sha, &pr.head.sha).await {
        return Ok(LocalSquash::RebaseFailed(error));
    }
    // The commits were squashed at this point, so a failed push is an operational error, not a
    // squash failure.
    local
        .force_push_head_to(&pr.head.name)
        .await
        .map_err(|error| WorkflowError::local_repo("Failed to push the squashed version", error))?;
    let head = local.get_head_sha().await.map_err(|error| {
        WorkflowError::local_repo("Failed to get the squashed branch's HEAD's SHA", error)
    })?;
    Ok(LocalSquash::Pushed(head))
}
