use std::rc::Rc;

use super::CodeEditor;
use crate::views::view::{ContentWidget, ContentWidgetData, OverlayWidget, OverlayWidgetData, OverviewRuler};

impl CodeEditor {
    /// Registers `widget`, reading its anchor once. Without a real view the
    /// widget waits for the next attachment.
    pub fn add_content_widget(&mut self, widget: Rc<dyn ContentWidget>) {
        let id = widget.id().to_string();
        let data = ContentWidgetData {
            position: widget.position(),
            widget,
        };
        if self.content_widgets.insert(&id, data) {
            tracing::warn!(editor = self.id, widget = %id, "overwriting a content widget with the same id");
        }
        if let (Some(view), Some(data)) = (
            self.attachment.as_mut().and_then(|att| att.view.as_mut()),
            self.content_widgets.get(&id),
        ) {
            view.add_content_widget(data);
        }
    }

    /// Re-reads the widget's anchor and forwards it to the live view.
    pub fn layout_content_widget(&mut self, widget: &dyn ContentWidget) {
        let Some(data) = self.content_widgets.get_mut(widget.id()) else {
            return;
        };
        data.position = widget.position();
        if let Some(view) = self.attachment.as_mut().and_then(|att| att.view.as_mut()) {
            view.layout_content_widget(data);
        }
    }

    pub fn remove_content_widget(&mut self, id: &str) {
        if self.content_widgets.remove(id).is_none() {
            return;
        }
        if let Some(view) = self.attachment.as_mut().and_then(|att| att.view.as_mut()) {
            view.remove_content_widget(id);
        }
    }

    pub fn add_overlay_widget(&mut self, widget: Rc<dyn OverlayWidget>) {
        let id = widget.id().to_string();
        let data = OverlayWidgetData {
            position: widget.position(),
            widget,
        };
        if self.overlay_widgets.insert(&id, data) {
            tracing::warn!(editor = self.id, widget = %id, "overwriting an overlay widget with the same id");
        }
        if let (Some(view), Some(data)) = (
            self.attachment.as_mut().and_then(|att| att.view.as_mut()),
            self.overlay_widgets.get(&id),
        ) {
            view.add_overlay_widget(data);
        }
    }

    pub fn layout_overlay_widget(&mut self, widget: &dyn OverlayWidget) {
        let Some(data) = self.overlay_widgets.get_mut(widget.id()) else {
            return;
        };
        data.position = widget.position();
        if let Some(view) = self.attachment.as_mut().and_then(|att| att.view.as_mut()) {
            view.layout_overlay_widget(data);
        }
    }

    pub fn remove_overlay_widget(&mut self, id: &str) {
        if self.overlay_widgets.remove(id).is_none() {
            return;
        }
        if let Some(view) = self.attachment.as_mut().and_then(|att| att.view.as_mut()) {
            view.remove_overlay_widget(id);
        }
    }

    pub fn content_widget_count(&self) -> usize {
        self.content_widgets.len()
    }

    pub fn overlay_widget_count(&self) -> usize {
        self.overlay_widgets.len()
    }

    /// `None` without a real view.
    pub fn create_overview_ruler(&mut self, class_name: &str) -> Option<OverviewRuler> {
        let view = self.attachment.as_mut()?.view.as_mut()?;
        view.create_overview_ruler(class_name)
    }
}
