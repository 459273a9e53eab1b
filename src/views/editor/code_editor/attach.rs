use std::cell::RefCell;
use std::rc::Rc;

use super::{Attachment, CodeEditor};
use crate::core::event::{CursorChangeReason, EditorEvent};
use crate::kernel::converter::CoordinatesConverter;
use crate::kernel::cursor::CursorState;
use crate::kernel::viewport::ViewLayout;
use crate::models::{ModelEvent, ModelId, TextModel};

impl CodeEditor {
    /// Attaches `model`, or just detaches when `None`. Attaching the model
    /// that is already attached does nothing.
    pub fn set_model(&mut self, model: Option<Rc<RefCell<TextModel>>>) {
        if let (Some(new), Some(att)) = (model.as_ref(), self.attachment.as_ref()) {
            if Rc::ptr_eq(new, &att.model) {
                return;
            }
        }
        if model.is_none() && self.attachment.is_none() {
            return;
        }
        if self.disposed && model.is_some() {
            tracing::warn!(editor = self.id, "set_model on a disposed editor");
            return;
        }

        self.sync_with_model();
        let old_model = self.detach_model();
        let new_model = model.map(|model| self.attach_model(model));
        tracing::debug!(editor = self.id, ?old_model, ?new_model, "model changed");
        self.queue(EditorEvent::ModelChanged {
            old_model,
            new_model,
        });
        self.flush_events();
    }

    fn attach_model(&mut self, model: Rc<RefCell<TextModel>>) -> ModelId {
        let (model_id, subscription) = {
            let mut m = model.borrow_mut();
            m.on_before_attached();
            (m.id(), m.subscribe())
        };

        let mut layout = ViewLayout::new(&self.config);
        layout.set_dimensions(self.dimensions.0, self.dimensions.1);
        let view = self
            .view_factory
            .as_ref()
            .and_then(|factory| factory.create_view(model_id));

        let mut att = Attachment {
            model,
            model_id,
            subscription,
            cursor: CursorState::new(self.config.max_cursor_count),
            converter: CoordinatesConverter::new(self.config.wrapping_column),
            layout,
            view,
        };

        if let Some(view) = att.view.as_mut() {
            for data in self.content_widgets.values() {
                view.add_content_widget(data);
            }
            for data in self.overlay_widgets.values() {
                view.add_overlay_widget(data);
            }
        }
        self.attachment = Some(att);
        model_id
    }

    /// Tears the current attachment down. Safe to call when detached.
    pub(super) fn detach_model(&mut self) -> Option<ModelId> {
        let att = self.attachment.take()?;

        {
            let mut model = att.model.borrow_mut();
            model.unsubscribe(att.subscription.id());
            model.remove_all_decorations_with_owner(self.id);
            model.on_before_detached();
        }
        self.decorations
            .clear(&mut self.decoration_types.borrow_mut());

        let model_id = att.model_id;
        if let Some(mut view) = att.view {
            view.dispose();
        }
        Some(model_id)
    }

    /// Applies every pending model notification: re-anchors cursors after
    /// edits made elsewhere, re-emits model events and detaches when the
    /// model is being disposed.
    pub fn sync_with_model(&mut self) {
        self.drain_model_events(false);
        self.flush_events();
    }

    /// `own` marks events caused by this editor's own mutation; their cursor
    /// effects were already applied. Edits made elsewhere are tracked one by
    /// one; cursors are clamped only once the queue is empty.
    pub(super) fn drain_model_events(&mut self, own: bool) {
        let mut content_changed = false;
        let mut cursor_reason = None;
        while let Some(event) = self
            .attachment
            .as_ref()
            .and_then(|att| att.subscription.try_recv())
        {
            if matches!(event, ModelEvent::ContentChanged(_)) {
                content_changed = true;
            }
            if let Some(reason) = self.handle_model_event(event, own) {
                if cursor_reason != Some(CursorChangeReason::ContentFlush) {
                    cursor_reason = Some(reason);
                }
            }
        }

        let update = match (cursor_reason, self.attachment.as_mut()) {
            (Some(_), Some(att)) => {
                let model = att.model.borrow();
                att.cursor.settle_external_changes(&model)
            }
            _ => None,
        };
        if let (Some(reason), Some(update)) = (cursor_reason, update) {
            self.queue_cursor_events(update, reason, "model", false);
        }
        if content_changed {
            self.clamp_scroll();
        }
    }

    /// Returns the cursor change reason when the event moved the cursors.
    fn handle_model_event(&mut self, event: ModelEvent, own: bool) -> Option<CursorChangeReason> {
        match event {
            ModelEvent::ContentChanged(change) => {
                let mut reason = None;
                if let Some(att) = self.attachment.as_mut() {
                    if change.is_flush || !own {
                        att.cursor.track_external_change(&change.changes, change.is_flush);
                        reason = Some(if change.is_flush {
                            CursorChangeReason::ContentFlush
                        } else {
                            CursorChangeReason::RecoverFromMarkers
                        });
                    }
                }
                self.queue(EditorEvent::ModelContentChanged(change));
                reason
            }
            ModelEvent::DecorationsChanged => {
                self.queue(EditorEvent::ModelDecorationsChanged);
                None
            }
            ModelEvent::OptionsChanged(options) => {
                self.queue(EditorEvent::ModelOptionsChanged(options));
                None
            }
            ModelEvent::LanguageChanged {
                old_language,
                new_language,
            } => {
                self.queue(EditorEvent::ModelLanguageChanged {
                    old_language,
                    new_language,
                });
                None
            }
            ModelEvent::WillDispose => {
                tracing::debug!(editor = self.id, "model disposed; detaching");
                let old_model = self.detach_model();
                self.queue(EditorEvent::ModelChanged {
                    old_model,
                    new_model: None,
                });
                None
            }
        }
    }
}
