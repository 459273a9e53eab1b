//! Editor actions: named, host-registered async handlers.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use compact_str::CompactString;
use serde_json::Value;

use super::error::{EditorError, ErrorSink, Result};

pub type ActionFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

type Handler = dyn Fn(&Value) -> ActionFuture;

#[derive(Clone)]
pub struct EditorAction {
    id: CompactString,
    label: String,
    handler: Rc<Handler>,
}

impl EditorAction {
    pub fn new(
        id: impl Into<CompactString>,
        label: impl Into<String>,
        handler: impl Fn(&Value) -> ActionFuture + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            handler: Rc::new(handler),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Starts the action. Failures never reach the caller; they go to `sink`.
    pub fn run(&self, payload: &Value, runtime: Option<&tokio::runtime::Handle>, sink: &ErrorSink) {
        let future = (self.handler)(payload);
        drive(self.id.clone(), future, runtime, sink.clone());
    }
}

impl fmt::Debug for EditorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorAction")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Spawns on the given (or ambient) runtime; without one, runs the future to
/// completion on a throwaway current-thread runtime.
fn drive(id: CompactString, future: ActionFuture, runtime: Option<&tokio::runtime::Handle>, sink: ErrorSink) {
    let handle = runtime
        .cloned()
        .or_else(|| tokio::runtime::Handle::try_current().ok());

    if let Some(handle) = handle {
        handle.spawn(async move {
            if let Err(err) = future.await {
                report(&id, err, &sink);
            }
        });
        return;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            sink.report(&EditorError::UnexpectedAsyncFailure(err.to_string()));
            return;
        }
    };
    if let Err(err) = runtime.block_on(future) {
        report(&id, err, &sink);
    }
}

fn report(id: &str, err: EditorError, sink: &ErrorSink) {
    tracing::debug!(action = id, error = %err, "action failed");
    let err = match err {
        EditorError::UnexpectedAsyncFailure(_) => err,
        other => EditorError::UnexpectedAsyncFailure(format!("{id}: {other}")),
    };
    sink.report(&err);
}

#[cfg(test)]
#[path = "../../tests/unit/core/action.rs"]
mod tests;
