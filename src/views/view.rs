//! The seam between the editor and whatever paints it.
//!
//! The editor never renders; it forwards widget placement and focus to a
//! `View` when the host's `ViewFactory` produced one for the attachment.

use std::rc::Rc;

use compact_str::CompactString;

use crate::models::{ModelId, Position, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentWidgetPositionPreference {
    Exact,
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentWidgetPosition {
    pub position: Position,
    pub preference: Vec<ContentWidgetPositionPreference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayWidgetPositionPreference {
    TopRightCorner,
    BottomRightCorner,
    TopCenter,
}

/// A widget anchored to a text position.
pub trait ContentWidget {
    fn id(&self) -> &str;
    /// Current anchor; `None` hides the widget.
    fn position(&self) -> Option<ContentWidgetPosition>;
    fn allow_editor_overflow(&self) -> bool {
        false
    }
}

/// A widget pinned to the editor frame.
pub trait OverlayWidget {
    fn id(&self) -> &str;
    fn position(&self) -> Option<OverlayWidgetPositionPreference>;
}

/// A content widget plus the anchor read when it was last added or laid out.
#[derive(Clone)]
pub struct ContentWidgetData {
    pub widget: Rc<dyn ContentWidget>,
    pub position: Option<ContentWidgetPosition>,
}

#[derive(Clone)]
pub struct OverlayWidgetData {
    pub widget: Rc<dyn OverlayWidget>,
    pub position: Option<OverlayWidgetPositionPreference>,
}

impl std::fmt::Debug for ContentWidgetData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentWidgetData")
            .field("id", &self.widget.id())
            .field("position", &self.position)
            .finish()
    }
}

impl std::fmt::Debug for OverlayWidgetData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayWidgetData")
            .field("id", &self.widget.id())
            .field("position", &self.position)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewRuler {
    pub class_name: CompactString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseTargetType {
    /// Over text.
    ContentText,
    /// Past the end of a line or below the last line.
    ContentEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseTarget {
    pub kind: MouseTargetType,
    pub position: Position,
    pub range: Range,
}

pub trait View {
    fn render(&mut self, force: bool);
    fn focus(&mut self);
    fn is_focused(&self) -> bool;

    fn add_content_widget(&mut self, data: &ContentWidgetData);
    fn layout_content_widget(&mut self, data: &ContentWidgetData);
    fn remove_content_widget(&mut self, id: &str);

    fn add_overlay_widget(&mut self, data: &OverlayWidgetData);
    fn layout_overlay_widget(&mut self, data: &OverlayWidgetData);
    fn remove_overlay_widget(&mut self, id: &str);

    fn create_overview_ruler(&mut self, class_name: &str) -> Option<OverviewRuler> {
        Some(OverviewRuler {
            class_name: CompactString::from(class_name),
        })
    }

    fn dispose(&mut self) {}
}

/// Decides whether an attachment gets a real view.
pub trait ViewFactory {
    fn create_view(&self, model: ModelId) -> Option<Box<dyn View>>;
}
