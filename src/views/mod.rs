//! View layer: the editor widget and the trait its host renders through.

pub mod editor;
pub mod view;

pub use editor::{CodeEditor, DecorationOptions, EditorContribution, ViewState};
pub use view::{
    ContentWidget, ContentWidgetData, ContentWidgetPosition, ContentWidgetPositionPreference,
    MouseTarget, MouseTargetType, OverlayWidget, OverlayWidgetData, OverlayWidgetPositionPreference,
    OverviewRuler, View, ViewFactory,
};
