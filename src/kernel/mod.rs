//! Headless editor kernel: configuration, coordinate conversion, cursor state,
//! scroll geometry and the decoration type registry.

pub mod config;
pub mod converter;
pub mod cursor;
pub mod decoration_types;
pub mod viewport;

pub use config::{EditorConfig, DEFAULT_MAX_CURSOR_COUNT};
pub use converter::{column_from_visible_column, visible_column, CoordinatesConverter};
pub use cursor::{
    CursorSnapshot, CursorState, CursorUpdate, EditOutcome, ResultingSelection, SavedCursorState,
};
pub use decoration_types::{
    DecorationRenderOptions, DecorationTypeService, SharedDecorationTypes,
};
pub use viewport::{ScrollState, VerticalRevealType, ViewLayout, VisiblePosition};
