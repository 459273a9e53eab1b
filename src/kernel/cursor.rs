//! Cursor/selection state machine for one model attachment.
//!
//! Holds 1..=max selections, kept sorted and non-overlapping, plus the
//! composition flag and the typing-coalescing bookkeeping that decides where
//! undo boundaries go. Events are the caller's business: every mutating call
//! returns a [`CursorUpdate`] describing what happened.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use super::converter::{column_from_visible_column, visible_column, CoordinatesConverter};
use crate::core::command::{CursorDirection, EditCommand};
use crate::core::error::{EditorError, Result};
use crate::models::cursor_set::normalize;
use crate::models::edit_op::adjust_position_after_edits;
use crate::models::{Affinity, AppliedEdit, Position, Range, Selection, SingleEditOperation, TextModel};

/// How selections are derived after `execute_edits`.
pub enum ResultingSelection {
    /// Selections are carried through the edits.
    Unchanged,
    Selections(Vec<Selection>),
    /// A collapsed caret after each applied edit.
    CaretAfterEdits,
    /// Returning `None` falls back to `Unchanged`.
    Compute(Box<dyn FnOnce(&[AppliedEdit]) -> Option<Vec<Selection>>>),
}

impl fmt::Debug for ResultingSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultingSelection::Unchanged => f.write_str("Unchanged"),
            ResultingSelection::Selections(list) => f.debug_tuple("Selections").field(list).finish(),
            ResultingSelection::CaretAfterEdits => f.write_str("CaretAfterEdits"),
            ResultingSelection::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

/// Result of a state-machine step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorUpdate {
    pub changed: bool,
    /// Set only on the first capping since this state was created.
    pub reached_limit: bool,
}

#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub applied: Vec<AppliedEdit>,
    pub update: CursorUpdate,
}

/// Serialized form of one cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorSnapshot {
    pub in_selection_mode: bool,
    pub selection_start: Position,
    pub position: Position,
}

impl CursorSnapshot {
    pub fn from_selection(selection: &Selection) -> Self {
        Self {
            in_selection_mode: !selection.is_empty(),
            selection_start: selection.anchor(),
            position: selection.active(),
        }
    }

    pub fn to_selection(self) -> Selection {
        if self.in_selection_mode {
            Selection::new(self.selection_start, self.position)
        } else {
            Selection::caret(self.position)
        }
    }
}

/// Saved cursor state as found on disk: a list, or a single object written by
/// older versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavedCursorState {
    Many(Vec<CursorSnapshot>),
    Single(CursorSnapshot),
}

impl SavedCursorState {
    pub fn into_vec(self) -> Vec<CursorSnapshot> {
        match self {
            SavedCursorState::Many(list) => list,
            SavedCursorState::Single(one) => vec![one],
        }
    }
}

impl Default for SavedCursorState {
    fn default() -> Self {
        SavedCursorState::Many(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Typing,
    Other,
}

#[derive(Debug)]
pub struct CursorState {
    selections: Vec<Selection>,
    primary: usize,
    max_cursor_count: usize,
    limit_warned: bool,
    composing: bool,
    last_edit: Option<EditKind>,
    /// Selections mapped through edits made elsewhere, not yet clamped.
    pending_external: Option<Vec<Selection>>,
}

impl CursorState {
    pub fn new(max_cursor_count: usize) -> Self {
        Self {
            selections: vec![Selection::caret(Position::new(1, 1))],
            primary: 0,
            max_cursor_count: max_cursor_count.max(1),
            limit_warned: false,
            composing: false,
            last_edit: None,
            pending_external: None,
        }
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn primary(&self) -> Selection {
        self.selections[self.primary]
    }

    pub fn secondary(&self) -> Vec<Selection> {
        self.selections
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != self.primary)
            .map(|(_, selection)| *selection)
            .collect()
    }

    pub fn cursor_count(&self) -> usize {
        self.selections.len()
    }

    pub fn max_cursor_count(&self) -> usize {
        self.max_cursor_count
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Clamps, caps, normalizes and installs `list`; `list[primary]` stays
    /// primary.
    fn accept(&mut self, model: &TextModel, mut list: Vec<Selection>, primary: usize) -> CursorUpdate {
        let mut update = CursorUpdate::default();
        if list.is_empty() {
            list.push(Selection::caret(Position::new(1, 1)));
        }
        for selection in &mut list {
            *selection = selection.map(|pos| model.validate_position(pos));
        }

        let primary_selection = list[primary.min(list.len() - 1)];
        let mut normalized = normalize(list);
        let mut primary_idx = locate_primary(&normalized, primary_selection);

        if normalized.len() > self.max_cursor_count {
            // Keep the primary plus the cursors nearest the document start.
            let keep = normalized[primary_idx];
            let mut kept: Vec<Selection> = normalized
                .into_iter()
                .filter(|selection| *selection != keep)
                .take(self.max_cursor_count - 1)
                .collect();
            kept.push(keep);
            kept.sort_by_key(|selection| (selection.start(), selection.end()));
            primary_idx = locate_primary(&kept, keep);
            normalized = kept;
            if !self.limit_warned {
                self.limit_warned = true;
                update.reached_limit = true;
            }
        }

        update.changed = normalized != self.selections || primary_idx != self.primary;
        self.selections = normalized;
        self.primary = primary_idx;
        update
    }

    pub(crate) fn check_well_formed(selections: &[Selection]) -> Result<()> {
        if selections.is_empty() {
            return Err(EditorError::invalid("selection list is empty"));
        }
        match selections.iter().find(|s| !s.is_well_formed()) {
            Some(bad) => Err(EditorError::invalid(format!(
                "malformed selection {} -> {}",
                bad.anchor(),
                bad.active()
            ))),
            None => Ok(()),
        }
    }

    /// Replaces the selection set; the first element becomes primary.
    pub fn set_selections(&mut self, model: &TextModel, selections: &[Selection]) -> Result<CursorUpdate> {
        Self::check_well_formed(selections)?;
        self.last_edit = None;
        Ok(self.accept(model, selections.to_vec(), 0))
    }

    fn tracked(&self, applied: &[AppliedEdit]) -> Vec<Selection> {
        self.selections
            .iter()
            .map(|selection| track_selection(*selection, applied))
            .collect()
    }

    /// Maps the selections through one edit made elsewhere. Positions are
    /// only clamped by [`settle_external_changes`](Self::settle_external_changes),
    /// once every queued edit has been tracked.
    pub fn track_external_change(&mut self, applied: &[AppliedEdit], is_flush: bool) {
        let list = if is_flush {
            vec![Selection::caret(Position::new(1, 1))]
        } else {
            self.pending_external
                .take()
                .unwrap_or_else(|| self.selections.clone())
                .into_iter()
                .map(|selection| track_selection(selection, applied))
                .collect()
        };
        self.pending_external = Some(list);
    }

    /// Clamps and installs the selections tracked since the last settle.
    pub fn settle_external_changes(&mut self, model: &TextModel) -> Option<CursorUpdate> {
        let list = self.pending_external.take()?;
        Some(self.accept(model, list, self.primary))
    }

    /// Re-anchors selections after another editor changed the shared model.
    pub fn on_external_change(&mut self, model: &TextModel, applied: &[AppliedEdit], is_flush: bool) -> CursorUpdate {
        self.track_external_change(applied, is_flush);
        self.settle_external_changes(model).unwrap_or_default()
    }

    pub fn execute_edits(
        &mut self,
        model: &mut TextModel,
        edits: Vec<SingleEditOperation>,
        policy: ResultingSelection,
    ) -> Result<EditOutcome> {
        if let Some(bad) = edits.iter().find(|edit| !edit.range.is_well_formed()) {
            return Err(EditorError::invalid(format!("malformed edit range {}", bad.range)));
        }
        if let ResultingSelection::Selections(list) = &policy {
            Self::check_well_formed(list)?;
        }

        let applied = model.push_edit_operations(Some(&self.selections), edits)?;
        self.last_edit = Some(EditKind::Other);

        let list = match policy {
            ResultingSelection::Unchanged => self.tracked(&applied),
            ResultingSelection::Selections(list) => list,
            ResultingSelection::CaretAfterEdits => applied
                .iter()
                .map(|edit| Selection::caret(edit.new_range.end))
                .collect(),
            ResultingSelection::Compute(compute) => match compute(&applied) {
                Some(list) if Self::check_well_formed(&list).is_ok() => list,
                Some(_) => {
                    tracing::warn!("computed selections are malformed; keeping tracked selections");
                    self.tracked(&applied)
                }
                None => self.tracked(&applied),
            },
        };
        let primary = if list.len() == self.selections.len() { self.primary } else { 0 };
        let update = self.accept(model, list, primary);
        model.set_undo_after_selections(&self.selections);
        Ok(EditOutcome { applied, update })
    }

    /// Applies one edit per selection; each selection becomes a caret after
    /// its own edit.
    fn edit_each(
        &mut self,
        model: &mut TextModel,
        edits: Vec<SingleEditOperation>,
    ) -> Result<EditOutcome> {
        let ranges: Vec<Range> = edits.iter().map(|edit| edit.range).collect();
        let applied = model.push_edit_operations(Some(&self.selections), edits)?;
        let list = ranges
            .iter()
            .map(|range| Selection::caret(adjust_position_after_edits(range.end, &applied, Affinity::After)))
            .collect();
        let update = self.accept(model, list, self.primary);
        model.set_undo_after_selections(&self.selections);
        Ok(EditOutcome { applied, update })
    }

    fn begin_typing(&mut self, model: &mut TextModel) {
        if !self.composing && self.last_edit != Some(EditKind::Typing) {
            model.push_stack_element();
        }
    }

    pub fn type_text(&mut self, model: &mut TextModel, text: &str) -> Result<EditOutcome> {
        self.begin_typing(model);
        let edits = self
            .selections
            .iter()
            .map(|selection| SingleEditOperation::new(selection.range(), text))
            .collect();
        let outcome = self.edit_each(model, edits)?;
        self.last_edit = Some(EditKind::Typing);
        Ok(outcome)
    }

    /// Replaces up to `replace_char_count` chars before each caret (IME
    /// pre-edit updates). Non-empty selections are replaced as a whole.
    pub fn replace_previous_char(
        &mut self,
        model: &mut TextModel,
        text: &str,
        replace_char_count: usize,
    ) -> Result<EditOutcome> {
        self.begin_typing(model);
        let edits = self
            .selections
            .iter()
            .map(|selection| {
                let range = if selection.is_empty() {
                    let pos = selection.active();
                    let start = pos.with_column(pos.column.saturating_sub(replace_char_count).max(1));
                    Range::new(start, pos)
                } else {
                    selection.range()
                };
                SingleEditOperation::new(range, text)
            })
            .collect();
        let outcome = self.edit_each(model, edits)?;
        self.last_edit = Some(EditKind::Typing);
        Ok(outcome)
    }

    /// Pastes `text` (or one `multicursor_text` piece per selection when the
    /// counts match). Returns the outcome and the primary pasted range.
    pub fn paste(
        &mut self,
        model: &mut TextModel,
        text: &str,
        paste_on_new_line: bool,
        multicursor_text: Option<&[String]>,
    ) -> Result<(EditOutcome, Range)> {
        let pieces: Vec<&str> = match multicursor_text {
            Some(pieces) if pieces.len() == self.selections.len() => {
                pieces.iter().map(String::as_str).collect()
            }
            _ => vec![text; self.selections.len()],
        };

        let mut edits = Vec::with_capacity(pieces.len());
        let mut whole_line = Vec::with_capacity(pieces.len());
        for (selection, piece) in self.selections.iter().zip(&pieces) {
            let as_line = paste_on_new_line && selection.is_empty() && piece.ends_with('\n');
            let range = if as_line {
                Range::empty(selection.active().with_column(1))
            } else {
                selection.range()
            };
            edits.push(SingleEditOperation::new(range, *piece));
            whole_line.push(as_line);
        }

        model.push_stack_element();
        let ranges: Vec<Range> = edits.iter().map(|edit| edit.range).collect();
        let applied = model.push_edit_operations(Some(&self.selections), edits)?;

        let list: Vec<Selection> = ranges
            .iter()
            .zip(&whole_line)
            .zip(&self.selections)
            .map(|((range, as_line), selection)| {
                if *as_line {
                    track_selection(*selection, &applied)
                } else {
                    Selection::caret(adjust_position_after_edits(range.end, &applied, Affinity::After))
                }
            })
            .collect();

        let primary_range = ranges[self.primary];
        let pasted = Range::new(
            adjust_position_after_edits(primary_range.start, &applied, Affinity::Before),
            adjust_position_after_edits(primary_range.end, &applied, Affinity::After),
        );

        let update = self.accept(model, list, self.primary);
        model.set_undo_after_selections(&self.selections);
        model.push_stack_element();
        self.last_edit = Some(EditKind::Other);
        Ok((EditOutcome { applied, update }, pasted))
    }

    /// Deletes every non-empty selection. `None` when there is nothing to cut.
    pub fn cut(&mut self, model: &mut TextModel) -> Result<Option<EditOutcome>> {
        let edits: Vec<SingleEditOperation> = self
            .selections
            .iter()
            .filter(|selection| !selection.is_empty())
            .map(|selection| SingleEditOperation::delete(selection.range()))
            .collect();
        if edits.is_empty() {
            return Ok(None);
        }

        model.push_stack_element();
        let applied = model.push_edit_operations(Some(&self.selections), edits)?;
        let list = self
            .selections
            .iter()
            .map(|selection| {
                Selection::caret(adjust_position_after_edits(selection.start(), &applied, Affinity::Before))
            })
            .collect();
        let update = self.accept(model, list, self.primary);
        model.set_undo_after_selections(&self.selections);
        model.push_stack_element();
        self.last_edit = Some(EditKind::Other);
        Ok(Some(EditOutcome { applied, update }))
    }

    pub fn execute_command(&mut self, model: &mut TextModel, command: &dyn EditCommand) -> Result<EditOutcome> {
        let commands: Vec<Option<&dyn EditCommand>> = vec![Some(command); self.selections.len()];
        self.run_commands(model, &commands)
    }

    /// `commands[i]` runs against selection `i`; `None` leaves that selection
    /// to be tracked.
    pub fn execute_commands(
        &mut self,
        model: &mut TextModel,
        commands: &[Option<Rc<dyn EditCommand>>],
    ) -> Result<EditOutcome> {
        let commands: Vec<Option<&dyn EditCommand>> = commands
            .iter()
            .map(|command| command.as_deref())
            .collect();
        self.run_commands(model, &commands)
    }

    fn run_commands(&mut self, model: &mut TextModel, commands: &[Option<&dyn EditCommand>]) -> Result<EditOutcome> {
        let mut edits = Vec::new();
        for (selection, command) in self.selections.iter().zip(commands) {
            if let Some(command) = command {
                edits.extend(command.edit_operations(model, selection));
            }
        }

        model.push_stack_element();
        let applied = model.push_edit_operations(Some(&self.selections), edits)?;
        let model_ref: &TextModel = model;
        let list = self
            .selections
            .iter()
            .zip(commands.iter().copied().chain(std::iter::repeat(None)))
            .map(|(selection, command)| {
                command
                    .and_then(|command| command.compute_cursor_state(model_ref, &applied, selection))
                    .filter(Selection::is_well_formed)
                    .unwrap_or_else(|| track_selection(*selection, &applied))
            })
            .collect();
        let update = self.accept(model, list, self.primary);
        model.set_undo_after_selections(&self.selections);
        model.push_stack_element();
        self.last_edit = Some(EditKind::Other);
        Ok(EditOutcome { applied, update })
    }

    pub fn composition_start(&mut self, model: &mut TextModel) {
        if !self.composing {
            model.push_stack_element();
            self.composing = true;
        }
    }

    pub fn composition_end(&mut self, model: &mut TextModel) {
        if self.composing {
            self.composing = false;
            model.push_stack_element();
            self.last_edit = None;
        }
    }

    pub fn undo(&mut self, model: &mut TextModel) -> Result<Option<CursorUpdate>> {
        self.undo_redo(model, true)
    }

    pub fn redo(&mut self, model: &mut TextModel) -> Result<Option<CursorUpdate>> {
        self.undo_redo(model, false)
    }

    fn undo_redo(&mut self, model: &mut TextModel, undo: bool) -> Result<Option<CursorUpdate>> {
        if model.is_read_only() {
            return Err(EditorError::ReadOnlyViolation);
        }
        self.last_edit = None;
        let step = if undo { model.undo()? } else { model.redo()? };
        let Some(step) = step else {
            return Ok(None);
        };

        let (list, primary) = match step.selections {
            Some(list) => (list, 0),
            None => {
                let mut list = self.selections.clone();
                for batch in &step.batches {
                    list = list.into_iter().map(|s| track_selection(s, batch)).collect();
                }
                (list, self.primary)
            }
        };
        Ok(Some(self.accept(model, list, primary)))
    }

    // ==================== movement ====================

    pub fn move_cursors(
        &mut self,
        model: &TextModel,
        converter: &CoordinatesConverter,
        direction: CursorDirection,
        select: bool,
    ) -> CursorUpdate {
        self.last_edit = None;
        let list = self
            .selections
            .iter()
            .map(|selection| move_selection(model, converter, *selection, direction, select))
            .collect();
        self.accept(model, list, self.primary)
    }

    pub fn select_all(&mut self, model: &TextModel) -> CursorUpdate {
        self.last_edit = None;
        self.accept(model, vec![Selection::from(model.full_range())], 0)
    }

    /// Adds a caret one view line above (or below) every cursor. Cursors
    /// already on the first (or last) view line add nothing.
    pub fn add_cursors_vertically(
        &mut self,
        model: &TextModel,
        converter: &CoordinatesConverter,
        down: bool,
    ) -> CursorUpdate {
        self.last_edit = None;
        let mut list = self.selections.clone();
        for selection in &self.selections {
            if let Some(pos) = vertical_target(model, converter, selection.active(), down) {
                list.push(Selection::caret(pos));
            }
        }
        self.accept(model, list, self.primary)
    }

    pub fn remove_secondary_cursors(&mut self, model: &TextModel) -> CursorUpdate {
        self.accept(model, vec![self.primary()], 0)
    }

    // ==================== persistence ====================

    /// Primary first, then the rest in document order.
    pub fn save_state(&self) -> Vec<CursorSnapshot> {
        std::iter::once(self.primary())
            .chain(self.secondary())
            .map(|selection| CursorSnapshot::from_selection(&selection))
            .collect()
    }

    /// An empty list restores a single caret at the document start.
    pub fn restore_state(&mut self, model: &TextModel, states: &[CursorSnapshot]) -> Result<CursorUpdate> {
        let list: Vec<Selection> = states.iter().map(|state| state.to_selection()).collect();
        if list.is_empty() {
            return Ok(self.accept(model, vec![Selection::caret(Position::new(1, 1))], 0));
        }
        self.set_selections(model, &list)
    }
}

fn locate_primary(normalized: &[Selection], primary: Selection) -> usize {
    normalized
        .iter()
        .position(|s| *s == primary)
        .or_else(|| normalized.iter().position(|s| s.contains(primary.active())))
        .or_else(|| {
            normalized
                .iter()
                .position(|s| s.range().contains_position(primary.active()))
        })
        .unwrap_or(0)
}

/// Carets move past text typed at them; non-empty selections grow at both
/// edges.
fn track_selection(selection: Selection, applied: &[AppliedEdit]) -> Selection {
    if selection.is_empty() {
        return Selection::caret(adjust_position_after_edits(selection.active(), applied, Affinity::After));
    }
    let start = adjust_position_after_edits(selection.start(), applied, Affinity::Before);
    let end = adjust_position_after_edits(selection.end(), applied, Affinity::After);
    if selection.anchor() <= selection.active() {
        Selection::new(start, end)
    } else {
        Selection::new(end, start)
    }
}

fn prev_boundary(line: &str, column: usize) -> usize {
    let mut boundary = 1;
    for g in line.graphemes(true) {
        let next = boundary + g.chars().count();
        if next >= column {
            break;
        }
        boundary = next;
    }
    boundary
}

fn next_boundary(line: &str, column: usize) -> usize {
    let mut boundary = 1;
    for g in line.graphemes(true) {
        boundary += g.chars().count();
        if boundary > column {
            return boundary;
        }
    }
    boundary
}

fn prev_visible_line(converter: &CoordinatesConverter, line: usize) -> Option<usize> {
    (1..line).rev().find(|&l| !converter.is_line_hidden(l))
}

fn next_visible_line(model: &TextModel, converter: &CoordinatesConverter, line: usize) -> Option<usize> {
    (line + 1..=model.line_count()).find(|&l| !converter.is_line_hidden(l))
}

/// Same visible column one view line up or down; `None` at the edges.
fn vertical_target(
    model: &TextModel,
    converter: &CoordinatesConverter,
    pos: Position,
    down: bool,
) -> Option<Position> {
    let tab_size = model.options().tab_size;
    let view = converter.model_to_view(model, pos);
    let target_line = if down {
        Some(view.line + 1).filter(|&l| l <= converter.view_line_count(model))
    } else {
        view.line.checked_sub(1).filter(|&l| l >= 1)
    }?;

    let visible = visible_column(&converter.view_line_content(model, view.line), view.column, tab_size);
    let target_content = converter.view_line_content(model, target_line);
    let column = column_from_visible_column(&target_content, visible, tab_size);
    Some(converter.view_to_model(model, Position::new(target_line, column)))
}

fn move_selection(
    model: &TextModel,
    converter: &CoordinatesConverter,
    selection: Selection,
    direction: CursorDirection,
    select: bool,
) -> Selection {
    let collapse_from = |pos: Position| -> Option<Selection> {
        (!select && !selection.is_empty()).then(|| Selection::caret(pos))
    };

    let active = selection.active();
    let target = match direction {
        CursorDirection::Left => {
            if let Some(collapsed) = collapse_from(selection.start()) {
                return collapsed;
            }
            if active.column > 1 {
                active.with_column(prev_boundary(&model.line_content(active.line), active.column))
            } else {
                match prev_visible_line(converter, active.line) {
                    Some(line) => Position::new(line, model.line_max_column(line)),
                    None => active,
                }
            }
        }
        CursorDirection::Right => {
            if let Some(collapsed) = collapse_from(selection.end()) {
                return collapsed;
            }
            if active.column < model.line_max_column(active.line) {
                active.with_column(next_boundary(&model.line_content(active.line), active.column))
            } else {
                match next_visible_line(model, converter, active.line) {
                    Some(line) => Position::new(line, 1),
                    None => active,
                }
            }
        }
        CursorDirection::Up | CursorDirection::Down => {
            let down = direction == CursorDirection::Down;
            let from = match (select, selection.is_empty(), down) {
                (false, false, false) => selection.start(),
                (false, false, true) => selection.end(),
                _ => active,
            };
            vertical_target(model, converter, from, down).unwrap_or_else(|| {
                if down {
                    Position::new(model.line_count(), model.line_max_column(model.line_count()))
                } else {
                    Position::new(1, 1)
                }
            })
        }
        CursorDirection::Home => {
            let content = model.line_content(active.line);
            let first_non_ws = content
                .chars()
                .position(|c| !c.is_whitespace())
                .map_or(content.chars().count() + 1, |idx| idx + 1);
            active.with_column(if active.column == first_non_ws { 1 } else { first_non_ws })
        }
        CursorDirection::End => active.with_column(model.line_max_column(active.line)),
    };

    if select {
        selection.with_active(target)
    } else {
        Selection::caret(target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/cursor.rs"]
mod tests;
