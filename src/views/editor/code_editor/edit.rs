use std::rc::Rc;

use serde_json::Value;

use super::CodeEditor;
use crate::core::command::{EditCommand, EditorCommand};
use crate::core::error::{EditorError, Result};
use crate::core::event::{CursorChangeReason, EditorEvent};
use crate::kernel::converter::CoordinatesConverter;
use crate::kernel::cursor::{CursorState, CursorUpdate, ResultingSelection};
use crate::models::{Position, Selection, SingleEditOperation, TextModel};

impl CodeEditor {
    /// Runs `f` with the attached model borrowed mutably.
    pub(super) fn cursor_op<R>(
        &mut self,
        f: impl FnOnce(&mut CursorState, &mut TextModel, &CoordinatesConverter) -> R,
    ) -> Result<R> {
        let att = self
            .attachment
            .as_mut()
            .ok_or_else(|| EditorError::UnsupportedOperation("no model attached".into()))?;
        let mut model = att.model.borrow_mut();
        Ok(f(&mut att.cursor, &mut model, &att.converter))
    }

    /// Re-emits the model events caused by an edit of ours, then the cursor
    /// events for it.
    fn after_edit(&mut self, update: CursorUpdate, reason: CursorChangeReason, source: &str) {
        self.drain_model_events(true);
        self.queue_cursor_events(update, reason, source, false);
    }

    fn report_read_only(&mut self) {
        tracing::debug!(editor = self.id, "edit attempted on a read-only editor");
        self.queue(EditorEvent::DidAttemptReadOnlyEdit);
    }

    // ==================== content ====================

    pub fn value(&self) -> String {
        self.attachment
            .as_ref()
            .map(|att| att.model.borrow().value())
            .unwrap_or_default()
    }

    /// Replaces the whole content; cursors reset to the document start.
    pub fn set_value(&mut self, text: &str) {
        self.sync_with_model();
        let Some(att) = self.attachment.as_ref() else {
            return;
        };
        att.model.borrow_mut().set_value(text);
        self.drain_model_events(true);
        self.flush_events();
    }

    // ==================== selections ====================

    pub fn position(&self) -> Option<Position> {
        self.selection().map(|selection| selection.position())
    }

    pub fn selection(&self) -> Option<Selection> {
        self.attachment.as_ref().map(|att| att.cursor.primary())
    }

    /// Primary first, then the others in document order.
    pub fn selections(&self) -> Option<Vec<Selection>> {
        self.attachment.as_ref().map(|att| {
            std::iter::once(att.cursor.primary())
                .chain(att.cursor.secondary())
                .collect()
        })
    }

    pub fn set_position(&mut self, position: Position) -> Result<()> {
        self.set_selections("api", &[Selection::caret(position)])
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        self.set_selections("api", &[selection])
    }

    /// Replaces every selection; the first one becomes primary. Emits one
    /// cursor change even when nothing moved.
    pub fn set_selections(&mut self, source: &str, selections: &[Selection]) -> Result<()> {
        CursorState::check_well_formed(selections)?;
        self.sync_with_model();
        if !self.has_model() {
            return Ok(());
        }
        let update = self.cursor_op(|cursor, model, _| cursor.set_selections(model, selections))??;
        self.queue_cursor_events(update, CursorChangeReason::Explicit, source, true);
        self.flush_events();
        Ok(())
    }

    // ==================== edits ====================

    /// Closes the current undo group. `false` when detached or read-only.
    pub fn push_undo_stop(&mut self) -> bool {
        self.sync_with_model();
        if self.is_read_only() {
            return false;
        }
        match self.attachment.as_ref() {
            Some(att) => {
                att.model.borrow_mut().push_stack_element();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.attachment
            .as_ref()
            .is_some_and(|att| att.model.borrow().can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.attachment
            .as_ref()
            .is_some_and(|att| att.model.borrow().can_redo())
    }

    /// Applies `edits` as one batch. `Ok(false)` when detached or read-only;
    /// malformed or overlapping edits fail before anything changes.
    pub fn execute_edits(
        &mut self,
        source: &str,
        edits: Vec<SingleEditOperation>,
        policy: ResultingSelection,
    ) -> Result<bool> {
        self.sync_with_model();
        if !self.has_model() {
            return Ok(false);
        }
        if self.is_read_only() {
            self.report_read_only();
            self.flush_events();
            return Ok(false);
        }
        let result = self.cursor_op(|cursor, model, _| cursor.execute_edits(model, edits, policy))?;
        self.finish_edit(result.map(|outcome| outcome.update), source)
    }

    pub fn execute_command(&mut self, source: &str, command: &dyn EditCommand) -> Result<bool> {
        self.sync_with_model();
        if !self.has_model() {
            return Ok(false);
        }
        if self.is_read_only() {
            self.report_read_only();
            self.flush_events();
            return Ok(false);
        }
        let result = self.cursor_op(|cursor, model, _| cursor.execute_command(model, command))?;
        self.finish_edit(result.map(|outcome| outcome.update), source)
    }

    /// `commands[i]` runs against the i-th selection in document order.
    pub fn execute_commands(
        &mut self,
        source: &str,
        commands: &[Option<Rc<dyn EditCommand>>],
    ) -> Result<bool> {
        self.sync_with_model();
        if !self.has_model() {
            return Ok(false);
        }
        if self.is_read_only() {
            self.report_read_only();
            self.flush_events();
            return Ok(false);
        }
        let result = self.cursor_op(|cursor, model, _| cursor.execute_commands(model, commands))?;
        self.finish_edit(result.map(|outcome| outcome.update), source)
    }

    fn finish_edit(&mut self, result: Result<CursorUpdate>, source: &str) -> Result<bool> {
        let outcome = match result {
            Ok(update) => {
                self.after_edit(update, CursorChangeReason::NotSet, source);
                Ok(true)
            }
            Err(EditorError::ReadOnlyViolation) => {
                self.report_read_only();
                Ok(false)
            }
            Err(err) => Err(err),
        };
        self.flush_events();
        outcome
    }

    // ==================== trigger ====================

    /// Runs a named handler. Unknown ids that are not registered actions are
    /// ignored.
    pub fn trigger_named(&mut self, source: &str, handler_id: &str, payload: &Value) {
        match EditorCommand::from_name(handler_id, payload) {
            Some(EditorCommand::Custom(name)) => {
                self.sync_with_model();
                if !self.run_action(&name, payload) {
                    tracing::debug!(editor = self.id, handler = %name, "unknown command ignored");
                }
            }
            Some(command) => self.trigger(source, command),
            None => tracing::warn!(editor = self.id, handler = handler_id, "malformed command payload"),
        }
    }

    pub fn trigger(&mut self, source: &str, command: EditorCommand) {
        self.sync_with_model();
        if let EditorCommand::Custom(name) = &command {
            if !self.run_action(name, &Value::Null) {
                tracing::debug!(editor = self.id, handler = %name, "unknown command ignored");
            }
            return;
        }
        if !self.has_model() {
            return;
        }
        if command.is_edit_command() && self.is_read_only() {
            self.report_read_only();
            self.flush_events();
            return;
        }

        let name = command.name().to_string();
        match self.dispatch(source, command) {
            Ok(()) => {}
            Err(EditorError::ReadOnlyViolation) => self.report_read_only(),
            Err(err) => tracing::warn!(editor = self.id, command = %name, error = %err, "command failed"),
        }
        self.flush_events();
    }

    fn dispatch(&mut self, source: &str, command: EditorCommand) -> Result<()> {
        match command {
            EditorCommand::Type { text } => {
                self.queue(EditorEvent::WillType(text.clone()));
                let outcome = self.cursor_op(|cursor, model, _| cursor.type_text(model, &text))??;
                self.after_edit(outcome.update, CursorChangeReason::NotSet, source);
                self.queue(EditorEvent::DidType(text));
                self.reveal_primary_cursor();
            }
            EditorCommand::ReplacePreviousChar {
                text,
                replace_char_count,
            } => {
                let outcome = self.cursor_op(|cursor, model, _| {
                    cursor.replace_previous_char(model, &text, replace_char_count)
                })??;
                self.after_edit(outcome.update, CursorChangeReason::NotSet, source);
                self.reveal_primary_cursor();
            }
            EditorCommand::Paste {
                text,
                paste_on_new_line,
                multicursor_text,
            } => {
                let (outcome, pasted) = self.cursor_op(|cursor, model, _| {
                    cursor.paste(model, &text, paste_on_new_line, multicursor_text.as_deref())
                })??;
                self.after_edit(outcome.update, CursorChangeReason::Paste, source);
                self.queue(EditorEvent::DidPaste(pasted));
                self.reveal_primary_cursor();
            }
            EditorCommand::Cut => {
                if let Some(outcome) = self.cursor_op(|cursor, model, _| cursor.cut(model))?? {
                    self.after_edit(outcome.update, CursorChangeReason::NotSet, source);
                    self.reveal_primary_cursor();
                }
            }
            EditorCommand::CompositionStart => {
                self.cursor_op(|cursor, model, _| cursor.composition_start(model))?;
                self.queue(EditorEvent::CompositionStart);
            }
            EditorCommand::CompositionEnd => {
                self.cursor_op(|cursor, model, _| cursor.composition_end(model))?;
                self.queue(EditorEvent::CompositionEnd);
            }
            EditorCommand::ExecuteCommand(command) => {
                let outcome =
                    self.cursor_op(|cursor, model, _| cursor.execute_command(model, command.as_ref()))??;
                self.after_edit(outcome.update, CursorChangeReason::NotSet, source);
            }
            EditorCommand::ExecuteCommands(commands) => {
                let outcome =
                    self.cursor_op(|cursor, model, _| cursor.execute_commands(model, &commands))??;
                self.after_edit(outcome.update, CursorChangeReason::NotSet, source);
            }
            EditorCommand::Undo => {
                if let Some(update) = self.cursor_op(|cursor, model, _| cursor.undo(model))?? {
                    self.after_edit(update, CursorChangeReason::Undo, source);
                    self.reveal_primary_cursor();
                }
            }
            EditorCommand::Redo => {
                if let Some(update) = self.cursor_op(|cursor, model, _| cursor.redo(model))?? {
                    self.after_edit(update, CursorChangeReason::Redo, source);
                    self.reveal_primary_cursor();
                }
            }
            EditorCommand::CursorMove { direction, select } => {
                let update = self.cursor_op(|cursor, model, converter| {
                    cursor.move_cursors(model, converter, direction, select)
                })?;
                self.queue_cursor_events(update, CursorChangeReason::Explicit, source, false);
                self.reveal_primary_cursor();
            }
            EditorCommand::SelectAll => {
                let update = self.cursor_op(|cursor, model, _| cursor.select_all(model))?;
                self.queue_cursor_events(update, CursorChangeReason::Explicit, source, false);
            }
            EditorCommand::AddCursorAbove => self.add_cursors_vertically(source, false)?,
            EditorCommand::AddCursorBelow => self.add_cursors_vertically(source, true)?,
            EditorCommand::RemoveSecondaryCursors => {
                let update = self.cursor_op(|cursor, model, _| cursor.remove_secondary_cursors(model))?;
                self.queue_cursor_events(update, CursorChangeReason::Explicit, source, false);
            }
            EditorCommand::Custom(_) => {}
        }
        Ok(())
    }

    fn add_cursors_vertically(&mut self, source: &str, down: bool) -> Result<()> {
        let update = self.cursor_op(|cursor, model, converter| {
            cursor.add_cursors_vertically(model, converter, down)
        })?;
        self.queue_cursor_events(update, CursorChangeReason::Explicit, source, false);
        self.reveal_primary_cursor();
        Ok(())
    }
}
