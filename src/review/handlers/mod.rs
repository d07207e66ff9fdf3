use std::time::Duration;

use tracing::Instrument;

use crate::github::{Issue, PullRequest};
use crate::review::command::{classify, ReviewCommand};
use crate::review::event::{IssueComment, PullRequestEvent, ReviewEvent};
use crate::review::status::PublishError;
use crate::review::ReviewContext;

mod fixup;
mod peer_review;
mod squash;

pub use squash::SquashOutcome;

/// Operational failure of a workflow. The request is aborted and the failure is reported to the
/// operator, not to the reviewer.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Reading from the remote platform has failed.
    #[error("{message}")]
    UpstreamRead {
        message: String,
        cause: anyhow::Error,
    },
    /// Writing a commit status has failed.
    #[error(transparent)]
    UpstreamWrite(#[from] PublishError),
    /// A local git operation has failed.
    #[error("{message}")]
    LocalRepo {
        message: String,
        cause: anyhow::Error,
    },
    #[error("Handling the event did not finish within {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl WorkflowError {
    pub(crate) fn local_repo(message: &str, cause: anyhow::Error) -> Self {
        Self::LocalRepo {
            message: message.to_string(),
            cause,
        }
    }
}

/// Result of a successfully handled event.
#[derive(Debug, PartialEq)]
pub enum HandledEvent {
    /// Nothing to do for this event.
    Ignored(&'static str),
    Squash(SquashOutcome),
    PeerReviewed,
    /// Fixup detection has run. `pending` is `true` if a pending squash status was published.
    FixupsChecked { pending: bool },
}

impl HandledEvent {
    pub fn message(&self) -> &'static str {
        match self {
            HandledEvent::Ignored(reason) => *reason,
            HandledEvent::Squash(SquashOutcome::ReportedFailure) => {
                "Failed to autosquash the commits with an interactive rebase. Reported the failure."
            }
            HandledEvent::Squash(SquashOutcome::Squashed { .. })
            | HandledEvent::PeerReviewed
            | HandledEvent::FixupsChecked { .. } => "",
        }
    }
}

/// Executes a single review event.
pub async fn handle_review_event(
    ctx: &ReviewContext,
    event: ReviewEvent,
) -> Result<HandledEvent, WorkflowError> {
    match event {
        ReviewEvent::IssueComment(comment) => {
            let span = tracing::info_span!("Comment", pr = comment.issue().to_string());
            handle_comment(ctx, comment).instrument(span).await
        }
        ReviewEvent::PullRequest(event) => {
            let span = tracing::info_span!(
                "Pull request",
                pr = event.issue().to_string(),
                action = event.action
            );
            handle_pull_request(ctx, event).instrument(span).await
        }
    }
}

async fn handle_comment(
    ctx: &ReviewContext,
    comment: IssueComment,
) -> Result<HandledEvent, WorkflowError> {
    if !comment.is_pull_request {
        return Ok(HandledEvent::Ignored("Not a PR. Ignoring."));
    }
    match classify(&comment.body) {
        ReviewCommand::Squash => {
            let outcome = squash::command_squash(ctx, &comment.issue()).await?;
            Ok(HandledEvent::Squash(outcome))
        }
        ReviewCommand::PeerReview => {
            peer_review::command_peer_review(ctx, &comment.issue()).await?;
            Ok(HandledEvent::PeerReviewed)
        }
        ReviewCommand::Unrecognized => {
            tracing::trace!("Ignoring comment {:?}", comment.body);
            Ok(HandledEvent::Ignored("Not a command I understand. Ignoring."))
        }
    }
}

async fn handle_pull_request(
    ctx: &ReviewContext,
    event: PullRequestEvent,
) -> Result<HandledEvent, WorkflowError> {
    if !event.may_add_commits() {
        return Ok(HandledEvent::Ignored(
            "PR not opened or synchronized. Ignoring.",
        ));
    }
    let pending = fixup::check_fixup_commits(ctx, &event.issue()).await?;
    Ok(HandledEvent::FixupsChecked { pending })
}

async fn get_pull_request(
    ctx: &ReviewContext,
    issue: &Issue,
) -> Result<PullRequest, WorkflowError> {
    ctx.client
        .get_pull_request(&issue.repository.name, issue.number)
        .await
        .map_err(|cause| WorkflowError::UpstreamRead {
            message: format!("Getting PR {issue} failed"),
            cause,
        })
}
