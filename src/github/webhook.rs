//! Authentication and parsing of GitHub webhook deliveries.
use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;

use crate::github::Repository;
use crate::review::event::{IssueComment, PullRequestEvent, ReviewEvent};

pub const EVENT_HEADER: &str = "x-github-event";
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

const SIGNATURE_PREFIX: &str = "sha1=";

type HmacSha1 = Hmac<Sha1>;

/// Wrapper for a secret which is zeroed on drop and can be exposed only through the [`WebhookSecret::expose`] method.
pub struct WebhookSecret(SecretString);

impl WebhookSecret {
    pub fn new(secret: String) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret().as_str()
    }
}

/// The signature header is not valid hex.
#[derive(Debug, thiserror::Error)]
#[error("Malformed signature: {0}")]
pub struct MalformedSignature(#[from] hex::FromHexError);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Please provide a X-Hub-Signature")]
    MissingSignature,
    #[error("Failed to check the signature")]
    MalformedSignature(#[from] MalformedSignature),
    #[error("Bad X-Hub-Signature")]
    BadSignature,
}

/// Verifies that `body` was signed with `secret`.
///
/// `signature` is the value of the `X-Hub-Signature` header (`sha1=<hex digest>`). A header
/// without the `sha1=` prefix carries no digest and never matches.
pub fn verify_signature(
    body: &[u8],
    signature: &str,
    secret: &WebhookSecret,
) -> Result<bool, MalformedSignature> {
    let digest = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or_default();
    let digest = hex::decode(digest)?;

    let Ok(mut mac) = HmacSha1::new_from_slice(secret.expose().as_bytes()) else {
        return Ok(false);
    };
    mac.update(body);
    // Constant-time comparison
    Ok(mac.verify_slice(&digest).is_ok())
}

/// Checks the signature header of a webhook request.
pub fn authenticate(
    headers: &HeaderMap,
    body: &[u8],
    secret: &WebhookSecret,
) -> Result<(), AuthError> {
    let signature = match headers.get(SIGNATURE_HEADER).map(|v| v.to_str()) {
        None => return Err(AuthError::MissingSignature),
        Some(Ok(signature)) if signature.is_empty() => return Err(AuthError::MissingSignature),
        Some(Ok(signature)) => signature,
        Some(Err(_)) => return Err(AuthError::BadSignature),
    };
    if verify_signature(body, signature, secret)? {
        Ok(())
    } else {
        Err(AuthError::BadSignature)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Cannot parse webhook payload: {0}")]
pub struct ParseError(#[from] serde_json::Error);

#[derive(serde::Deserialize, Debug)]
struct WebhookOwner {
    login: String,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookRepository {
    name: String,
    owner: WebhookOwner,
    ssh_url: String,
}

impl From<WebhookRepository> for Repository {
    fn from(repo: WebhookRepository) -> Self {
        Repository::new(&repo.owner.login, &repo.name, &repo.ssh_url)
    }
}

#[derive(serde::Deserialize, Debug)]
struct WebhookPullRequestLink {
    #[serde(default)]
    url: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookIssue {
    number: u64,
    #[serde(default)]
    pull_request: Option<WebhookPullRequestLink>,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookComment {
    body: String,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookIssueComment {
    issue: WebhookIssue,
    comment: WebhookComment,
    repository: WebhookRepository,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookPullRequest {
    action: String,
    number: u64,
    repository: WebhookRepository,
}

pub fn parse_issue_comment(body: &[u8]) -> Result<IssueComment, ParseError> {
    let payload: WebhookIssueComment = serde_json::from_slice(body)?;
    let is_pull_request = payload
        .issue
        .pull_request
        .and_then(|pr| pr.url)
        .is_some_and(|url| !url.is_empty());
    Ok(IssueComment {
        issue_number: payload.issue.number.into(),
        body: payload.comment.body,
        is_pull_request,
        repository: payload.repository.into(),
    })
}

pub fn parse_pull_request_event(body: &[u8]) -> Result<PullRequestEvent, ParseError> {
    let payload: WebhookPullRequest = serde_json::from_slice(body)?;
    Ok(PullRequestEvent {
        issue_number: payload.number.into(),
        action: payload.action,
        repository: payload.repository.into(),
    })
}

/// Parses a webhook payload based on its event type.
/// Returns `None` for event types that are not handled.
pub fn parse_webhook_event(
    event_type: &str,
    body: &[u8],
) -> Result<Option<ReviewEvent>, ParseError> {
    match event_type {
        "issue_comment" => Ok(Some(ReviewEvent::IssueComment(parse_issue_comment(body)?))),
        "pull_request" => Ok(Some(ReviewEvent::PullRequest(parse_pull_request_event(
            body,
        )?))),
        _ => {
            tracing::debug!("Ignoring unknown event type {event_type:?}");
            Ok(None)
        }
    }
}
