use anyhow::Error;
use tracing::span::Span;

/// Reports a failed webhook request inside the span that handled it.
pub trait LogError {
    fn log_error(&self, error: Error);
}

impl LogError for Span {
    fn log_error(&self, error: Error) {
        self.in_scope(|| {
            tracing::error!("Request failed: {error:?}");
        });
    }
}
