//! Error taxonomy and the unexpected-error sink for deferred work.

use std::sync::{Arc, OnceLock, RwLock};

pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("model is read-only")]
    ReadOnlyViolation,
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// Logged when the cursor ceiling drops cursors; callers see
    /// `EditorEvent::ReachedMaxCursorCount` instead of an `Err`.
    #[error("capacity exceeded: at most {limit} cursors")]
    CapacityExceeded { limit: usize },
    #[error("unexpected failure in deferred work: {0}")]
    UnexpectedAsyncFailure(String),
    #[error("config: {0}")]
    Config(String),
}

impl EditorError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        EditorError::InvalidArgument(msg.into())
    }
}

impl From<std::io::Error> for EditorError {
    fn from(err: std::io::Error) -> Self {
        EditorError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::Config(err.to_string())
    }
}

type SinkFn = dyn Fn(&EditorError) + Send + Sync;

/// Receives failures that cannot be returned to the call site (deferred
/// actions). Cloning shares the same handler.
#[derive(Clone)]
pub struct ErrorSink {
    handler: Arc<SinkFn>,
}

impl ErrorSink {
    pub fn new(handler: impl Fn(&EditorError) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn report(&self, err: &EditorError) {
        (self.handler)(err);
    }

    /// Sink that only logs.
    pub fn logging() -> Self {
        Self::new(|err| tracing::error!(error = %err, "unexpected error"))
    }
}

impl std::fmt::Debug for ErrorSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorSink").finish_non_exhaustive()
    }
}

fn global_slot() -> &'static RwLock<ErrorSink> {
    static GLOBAL: OnceLock<RwLock<ErrorSink>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(ErrorSink::logging()))
}

/// Process-wide sink used by editors that were not given their own.
pub fn global_error_sink() -> ErrorSink {
    match global_slot().read() {
        Ok(sink) => sink.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub fn set_global_error_sink(sink: ErrorSink) {
    match global_slot().write() {
        Ok(mut slot) => *slot = sink,
        Err(poisoned) => *poisoned.into_inner() = sink,
    }
}

pub fn on_unexpected_error(err: &EditorError) {
    global_error_sink().report(err);
}

#[cfg(test)]
#[path = "../../tests/unit/core/error.rs"]
mod tests;
