use crate::github::Issue;
use crate::review::handlers::{get_pull_request, WorkflowError};
use crate::review::status::{publish_status, CommitStatus, StatusState};
use crate::review::ReviewContext;

const FIXUP_PREFIXES: &[&str] = &["fixup! ", "squash! "];

/// Returns `true` if the commit message marks the commit to be folded into an earlier commit.
pub(super) fn is_fixup_commit(message: &str) -> bool {
    FIXUP_PREFIXES
        .iter()
        .any(|prefix| message.starts_with(prefix))
}

/// Publishes a pending squash status if the PR contains fixup or squash commits.
/// Returns `true` if the status was published.
///
/// A PR without such commits is left alone, an earlier pending status is not cleared.
pub(super) async fn check_fixup_commits(
    ctx: &ReviewContext,
    issue: &Issue,
) -> Result<bool, WorkflowError> {
    tracing::info!("Checking for fixup commits for PR {issue}");
    let commits = ctx
        .client
        .get_pull_request_commits(&issue.repository.name, issue.number)
        .await
        .map_err(|cause| WorkflowError::UpstreamRead {
            message: format!("Getting commits for PR {issue} failed"),
            cause,
        })?;
    if !commits.iter().any(|commit| is_fixup_commit(&commit.message)) {
        return Ok(false);
    }

    let pr = get_pull_request(ctx, issue).await?;
    let status = CommitStatus::squash(
        StatusState::Pending,
        "This PR needs to be squashed with !squash before merging",
    );
    publish_status(
        ctx.client.as_ref(),
        &issue.repository.name,
        &pr.head.sha,
        &status,
    )
    .await?;
    Ok(true)
}
