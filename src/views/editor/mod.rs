//! The code editor widget and its per-editor registries.

pub mod code_editor;
pub mod decorations;
pub mod widgets;

pub use code_editor::{CodeEditor, EditorContribution, ViewState};
pub use decorations::{DecorationOptions, EditorDecorations};
pub use widgets::{WidgetKey, WidgetRegistry};
