//! zcode-widget: a headless code editor widget.
//!
//! Module layout:
//! - core: errors, events, commands and async actions
//! - kernel: cursor state machine, coordinate conversion, scroll geometry,
//!   decoration type registry
//! - models: positions, selections and the shared text model
//! - views: the `CodeEditor` and the traits a rendering view implements

pub mod core;
pub mod kernel;
pub mod models;
pub mod views;

pub use crate::core::error::{EditorError, Result};
pub use crate::kernel::{DecorationTypeService, EditorConfig};
pub use crate::models::{Position, Range, Selection, TextModel};
pub use crate::views::CodeEditor;
