use std::any::Any;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::Instrument;

use crate::github::response::WebhookResponse;
use crate::github::webhook::{authenticate, parse_webhook_event, WebhookSecret, EVENT_HEADER};
use crate::review::{handle_review_event, ReviewContext, WorkflowError};

/// Maximum accepted size of a webhook body.
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Shared server state for all axum handlers.
pub struct ServerState {
    ctx: ReviewContext,
    webhook_secret: WebhookSecret,
}

impl ServerState {
    pub fn new(ctx: ReviewContext, webhook_secret: WebhookSecret) -> Self {
        Self {
            ctx,
            webhook_secret,
        }
    }

    pub fn get_webhook_secret(&self) -> &WebhookSecret {
        &self.webhook_secret
    }
}

pub type ServerStateRef = Arc<ServerState>;

pub fn create_app(state: ServerState) -> Router {
    Router::new()
        .route("/", post(github_webhook_handler))
        .route("/github", post(github_webhook_handler))
        .route("/health", get(health_handler))
        .layer(ConcurrencyLimitLayer::new(100))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(Arc::new(state))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Router panicked: {err:?}");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "")
}

/// Axum handler that receives a webhook and handles the event it carries.
pub async fn github_webhook_handler(
    State(state): State<ServerStateRef>,
    headers: HeaderMap,
    body: Body,
) -> WebhookResponse {
    let body = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(body) => body,
        Err(error) => {
            return WebhookResponse::error(
                Some(error.into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read the request's body",
            )
        }
    };
    process_webhook(&state, &headers, &body).await
}

/// Authenticates, parses and handles a single webhook delivery.
pub async fn process_webhook(
    state: &ServerState,
    headers: &HeaderMap,
    body: &[u8],
) -> WebhookResponse {
    if let Err(error) = authenticate(headers, body, state.get_webhook_secret()) {
        return error.into();
    }

    let event_type = headers
        .get(EVENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let event = match parse_webhook_event(event_type, body) {
        Ok(Some(event)) => event,
        Ok(None) => return WebhookResponse::success("Not an event I understand. Ignoring."),
        Err(error) => return error.into(),
    };

    let span = tracing::info_span!("Webhook", event = event_type);
    let timeout = state.ctx.request_timeout();
    let result = tokio::time::timeout(timeout, handle_review_event(&state.ctx, event))
        .instrument(span)
        .await
        .unwrap_or(Err(WorkflowError::TimedOut(timeout)));
    match result {
        Ok(handled) => handled.into(),
        Err(error) => error.into(),
    }
}
