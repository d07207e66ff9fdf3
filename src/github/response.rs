use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::Span;

use crate::github::webhook::{AuthError, ParseError};
use crate::review::{HandledEvent, WorkflowError};
use crate::utils::logging::LogError;

/// Uniform outcome of a webhook request.
#[derive(Debug)]
pub enum WebhookResponse {
    Success(String),
    Error(ErrorResponse),
}

#[derive(Debug)]
pub struct ErrorResponse {
    pub cause: Option<anyhow::Error>,
    pub status: StatusCode,
    pub message: String,
}

impl WebhookResponse {
    pub fn success(message: &str) -> Self {
        Self::Success(message.to_string())
    }

    pub fn error(cause: Option<anyhow::Error>, status: StatusCode, message: &str) -> Self {
        Self::Error(ErrorResponse {
            cause,
            status,
            message: message.to_string(),
        })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebhookResponse::Success(_) => StatusCode::OK,
            WebhookResponse::Error(error) => error.status,
        }
    }
}

impl From<HandledEvent> for WebhookResponse {
    fn from(handled: HandledEvent) -> Self {
        WebhookResponse::success(handled.message())
    }
}

impl From<AuthError> for WebhookResponse {
    fn from(error: AuthError) -> Self {
        let message = error.to_string();
        match error {
            AuthError::MissingSignature => {
                WebhookResponse::error(None, StatusCode::UNAUTHORIZED, &message)
            }
            AuthError::BadSignature => WebhookResponse::error(None, StatusCode::FORBIDDEN, &message),
            AuthError::MalformedSignature(cause) => WebhookResponse::error(
                Some(cause.into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                &message,
            ),
        }
    }
}

impl From<ParseError> for WebhookResponse {
    fn from(error: ParseError) -> Self {
        WebhookResponse::error(
            Some(error.into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to parse the request's body",
        )
    }
}

impl From<WorkflowError> for WebhookResponse {
    fn from(error: WorkflowError) -> Self {
        let message = error.to_string();
        let cause = match error {
            WorkflowError::UpstreamRead { cause, .. } | WorkflowError::LocalRepo { cause, .. } => {
                Some(cause)
            }
            WorkflowError::UpstreamWrite(error) => Some(error.cause),
            WorkflowError::TimedOut(_) => None,
        };
        WebhookResponse::error(cause, StatusCode::BAD_GATEWAY, &message)
    }
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        match self {
            WebhookResponse::Success(message) => (StatusCode::OK, message).into_response(),
            WebhookResponse::Error(ErrorResponse {
                cause,
                status,
                message,
            }) => {
                match cause {
                    Some(cause) => Span::current().log_error(cause.context(message.clone())),
                    None => tracing::warn!("{message}"),
                }
                (status, message).into_response()
            }
        }
    }
}
