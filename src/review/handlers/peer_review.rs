use crate::github::Issue;
use crate::review::handlers::{get_pull_request, WorkflowError};
use crate::review::status::{publish_status, CommitStatus, StatusState};
use crate::review::ReviewContext;

/// Marks the PR as peer reviewed. There is no failure branch, repeating the command republishes
/// the same status.
pub(super) async fn command_peer_review(
    ctx: &ReviewContext,
    issue: &Issue,
) -> Result<(), WorkflowError> {
    tracing::info!("Marking PR {issue} as peer reviewed");
    let pr = get_pull_request(ctx, issue).await?;
    let status = CommitStatus::peer_review(StatusState::Success, "This PR has been peer reviewed");
    publish_status(
        ctx.client.as_ref(),
        &issue.repository.name,
        &pr.head.sha,
        &status,
    )
    .await?;
    Ok(())
}
