//! Core plumbing shared by the kernel and the views: errors, the event bus,
//! commands and actions.

pub mod action;
pub mod command;
pub mod error;
pub mod event;

pub use action::{ActionFuture, EditorAction};
pub use command::{CursorDirection, EditCommand, EditorCommand};
pub use error::{global_error_sink, on_unexpected_error, set_global_error_sink, EditorError, ErrorSink, Result};
pub use event::{
    CursorChangeReason, CursorPositionChangedEvent, CursorSelectionChangedEvent, EditorEvent,
    EditorEventKind, Emitter, ScrollEvent, Subscription,
};
