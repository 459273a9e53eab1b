use super::CodeEditor;
use crate::core::error::Result;
use crate::models::{
    DecorationId, DecorationsAccessor, DeltaDecoration, ModelDecoration, ModelDecorationOptions, Range,
};
use crate::views::editor::decorations::DecorationOptions;

impl CodeEditor {
    /// Replaces every decoration of `type_key`. No-op when detached.
    pub fn set_decorations(&mut self, type_key: &str, decorations: &[DecorationOptions]) -> Result<()> {
        self.sync_with_model();
        let Some(att) = self.attachment.as_ref() else {
            return Ok(());
        };
        let result = self.decorations.set_decorations(
            &mut self.decoration_types.borrow_mut(),
            &mut att.model.borrow_mut(),
            self.id,
            type_key,
            decorations,
        );
        self.drain_model_events(true);
        self.flush_events();
        result
    }

    pub fn set_decorations_fast(&mut self, type_key: &str, ranges: &[Range]) -> Result<()> {
        self.sync_with_model();
        let Some(att) = self.attachment.as_ref() else {
            return Ok(());
        };
        let result = self.decorations.set_decorations_fast(
            &mut self.decoration_types.borrow_mut(),
            &mut att.model.borrow_mut(),
            self.id,
            type_key,
            ranges,
        );
        self.drain_model_events(true);
        self.flush_events();
        result
    }

    /// Idempotent; unknown keys are ignored.
    pub fn remove_decorations(&mut self, type_key: &str) {
        self.sync_with_model();
        let Some(att) = self.attachment.as_ref() else {
            return;
        };
        self.decorations.remove_decorations(
            &mut self.decoration_types.borrow_mut(),
            &mut att.model.borrow_mut(),
            self.id,
            type_key,
        );
        self.drain_model_events(true);
        self.flush_events();
    }

    /// Owner-scoped replace. Empty input returns `old` untouched.
    pub fn delta_decorations(&mut self, old: &[DecorationId], new: &[DeltaDecoration]) -> Vec<DecorationId> {
        self.sync_with_model();
        let Some(att) = self.attachment.as_ref() else {
            return Vec::new();
        };
        if old.is_empty() && new.is_empty() {
            return Vec::new();
        }
        let ids = att.model.borrow_mut().delta_decorations(self.id, old, new);
        self.drain_model_events(true);
        self.flush_events();
        ids
    }

    /// `None` when detached.
    pub fn change_decorations<R>(&mut self, f: impl FnOnce(&mut DecorationsAccessor<'_>) -> R) -> Option<R> {
        self.sync_with_model();
        let att = self.attachment.as_ref()?;
        let out = att.model.borrow_mut().change_decorations(self.id, f);
        self.drain_model_events(true);
        self.flush_events();
        Some(out)
    }

    /// This editor's decorations touching `line`.
    pub fn line_decorations(&self, line: usize) -> Vec<ModelDecoration> {
        self.attachment
            .as_ref()
            .map(|att| att.model.borrow().get_line_decorations(line, Some(self.id)))
            .unwrap_or_default()
    }

    pub fn decoration_range(&self, id: DecorationId) -> Option<Range> {
        self.attachment.as_ref()?.model.borrow().decoration_range(id)
    }

    pub fn decoration_options(&self, id: DecorationId) -> Option<ModelDecorationOptions> {
        self.attachment.as_ref()?.model.borrow().decoration_options(id).cloned()
    }

    pub fn decoration_ids(&self, type_key: &str) -> Vec<DecorationId> {
        self.decorations.ids_for(type_key).to_vec()
    }
}
