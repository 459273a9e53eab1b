//! Rope-backed text model.
//!
//! Owns line content, decorations and the undo stack. Editors observe it
//! through a [`ModelSubscription`]: every mutation is pushed into a channel per
//! subscriber and drained by the editor after the mutating call returns, so a
//! model shared behind `Rc<RefCell<_>>` is never re-borrowed from inside its
//! own notification.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use ropey::{Rope, RopeSlice};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::decoration::{DecorationId, DeltaDecoration, ModelDecoration, ModelDecorationOptions, OwnerId};
use super::edit_op::{adjust_position_after_edits, sort_and_check_overlap, AppliedEdit, SingleEditOperation};
use super::position::{Position, Range};
use super::selection::Selection;
use crate::core::error::{EditorError, Result};

pub const DEFAULT_LANGUAGE: &str = "plaintext";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(u64);

impl ModelId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextModelOptions {
    pub tab_size: usize,
    pub insert_spaces: bool,
    pub read_only: bool,
}

impl Default for TextModelOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
            read_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChangedEvent {
    /// Sorted by `range.start`, in pre-change coordinates.
    pub changes: Vec<AppliedEdit>,
    pub version_id: u64,
    pub is_undoing: bool,
    pub is_redoing: bool,
    pub is_flush: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    ContentChanged(ContentChangedEvent),
    DecorationsChanged,
    OptionsChanged(TextModelOptions),
    LanguageChanged {
        old_language: String,
        new_language: String,
    },
    WillDispose,
}

slotmap::new_key_type! {
    pub struct ModelListenerId;
}

/// Receiving end of a model subscription.
#[derive(Debug)]
pub struct ModelSubscription {
    id: ModelListenerId,
    rx: Receiver<ModelEvent>,
}

impl ModelSubscription {
    pub fn id(&self) -> ModelListenerId {
        self.id
    }

    /// Next pending event; `None` when empty or when the model is gone.
    pub fn try_recv(&self) -> Option<ModelEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn drain(&self) -> Vec<ModelEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// Outcome of an undo or redo step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoStep {
    /// Selections recorded with the group, if any.
    pub selections: Option<Vec<Selection>>,
    /// One entry per replayed batch, in application order.
    pub batches: Vec<Vec<AppliedEdit>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeSource {
    Edit,
    Undo,
    Redo,
}

#[derive(Debug)]
struct UndoGroup {
    batches: Vec<Vec<AppliedEdit>>,
    selections_before: Option<Vec<Selection>>,
    selections_after: Option<Vec<Selection>>,
}

#[derive(Debug)]
pub struct TextModel {
    id: ModelId,
    rope: Rope,
    version_id: u64,
    options: TextModelOptions,
    language: String,
    decorations: SlotMap<DecorationId, ModelDecoration>,
    listeners: SlotMap<ModelListenerId, Sender<ModelEvent>>,
    undo_stack: Vec<UndoGroup>,
    redo_stack: Vec<UndoGroup>,
    group_open: bool,
    attached_editors: usize,
    disposed: bool,
}

impl TextModel {
    pub fn new(text: &str) -> Self {
        Self::with_options(text, TextModelOptions::default())
    }

    pub fn with_options(text: &str, options: TextModelOptions) -> Self {
        Self {
            id: ModelId::next(),
            rope: Rope::from_str(text),
            version_id: 1,
            options,
            language: DEFAULT_LANGUAGE.to_string(),
            decorations: SlotMap::with_key(),
            listeners: SlotMap::with_key(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            group_open: false,
            attached_editors: 0,
            disposed: false,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn version_id(&self) -> u64 {
        self.version_id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ==================== content ====================

    pub fn value(&self) -> String {
        self.rope.to_string()
    }

    /// Replaces the whole content. Clears undo history; decorations are
    /// clamped into the new content.
    pub fn set_value(&mut self, text: &str) {
        let old_range = self.full_range();
        let old_text = self.value();
        self.rope = Rope::from_str(text);
        self.version_id += 1;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group_open = false;

        let rope = &self.rope;
        for decoration in self.decorations.values_mut() {
            decoration.range = validate_range_in(rope, decoration.range);
        }

        let change = AppliedEdit {
            range: old_range,
            new_range: self.full_range(),
            text: text.to_string(),
            old_text,
        };
        self.emit(ModelEvent::ContentChanged(ContentChangedEvent {
            changes: vec![change],
            version_id: self.version_id,
            is_undoing: false,
            is_redoing: false,
            is_flush: true,
        }));
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a 1-based line without its line break. Out-of-range lines
    /// read as empty.
    pub fn line_content(&self, line: usize) -> String {
        if line == 0 || line > self.rope.len_lines() {
            return String::new();
        }
        let slice = self.rope.line(line - 1);
        let content_len = slice.len_chars() - line_break_len(slice);
        slice_to_cow(slice.slice(..content_len)).into_owned()
    }

    pub fn line_length(&self, line: usize) -> usize {
        line_length_in(&self.rope, line)
    }

    pub fn line_max_column(&self, line: usize) -> usize {
        self.line_length(line) + 1
    }

    pub fn full_range(&self) -> Range {
        let last = self.line_count();
        Range::new(Position::new(1, 1), Position::new(last, self.line_max_column(last)))
    }

    /// Clamps a position into the content. Callers reject zero coordinates
    /// before reaching here; the model still clamps them to 1.
    pub fn validate_position(&self, pos: Position) -> Position {
        validate_position_in(&self.rope, pos)
    }

    pub fn validate_range(&self, range: Range) -> Range {
        validate_range_in(&self.rope, range)
    }

    pub fn offset_at(&self, pos: Position) -> usize {
        offset_in(&self.rope, pos)
    }

    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line_idx = self.rope.char_to_line(offset);
        Position::new(line_idx + 1, offset - self.rope.line_to_char(line_idx) + 1)
    }

    pub fn value_in_range(&self, range: Range) -> String {
        let range = self.validate_range(range);
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end);
        slice_to_cow(self.rope.slice(start..end)).into_owned()
    }

    // ==================== options / language ====================

    pub fn options(&self) -> &TextModelOptions {
        &self.options
    }

    pub fn update_options(&mut self, options: TextModelOptions) {
        if self.options == options {
            return;
        }
        self.options = options.clone();
        self.emit(ModelEvent::OptionsChanged(options));
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: &str) {
        if self.language == language {
            return;
        }
        let old_language = std::mem::replace(&mut self.language, language.to_string());
        self.emit(ModelEvent::LanguageChanged {
            old_language,
            new_language: language.to_string(),
        });
    }

    // ==================== edits / undo ====================

    /// Closes the open undo group; the next edit starts a new one.
    pub fn push_stack_element(&mut self) {
        self.group_open = false;
    }

    /// Applies a batch atomically and records it in the open undo group.
    ///
    /// `selections_before` is stored when this batch opens a new group and is
    /// handed back by `undo`.
    pub fn push_edit_operations(
        &mut self,
        selections_before: Option<&[Selection]>,
        edits: Vec<SingleEditOperation>,
    ) -> Result<Vec<AppliedEdit>> {
        if self.options.read_only {
            return Err(EditorError::ReadOnlyViolation);
        }
        if self.disposed {
            return Err(EditorError::UnsupportedOperation(
                "edit on a disposed model".to_string(),
            ));
        }

        let applied = self.apply_batch(edits, ChangeSource::Edit)?;
        if applied.is_empty() {
            return Ok(applied);
        }

        self.redo_stack.clear();
        match self.undo_stack.last_mut() {
            Some(group) if self.group_open => group.batches.push(applied.clone()),
            _ => {
                self.undo_stack.push(UndoGroup {
                    batches: vec![applied.clone()],
                    selections_before: selections_before.map(<[Selection]>::to_vec),
                    selections_after: None,
                });
                self.group_open = true;
            }
        }
        Ok(applied)
    }

    /// Records the selections to restore when the last group is redone.
    pub fn set_undo_after_selections(&mut self, selections: &[Selection]) {
        if let Some(group) = self.undo_stack.last_mut() {
            group.selections_after = Some(selections.to_vec());
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> Result<Option<UndoStep>> {
        self.group_open = false;
        let Some(group) = self.undo_stack.pop() else {
            return Ok(None);
        };

        let mut changes = Vec::new();
        for batch in group.batches.iter().rev() {
            let inverse = batch
                .iter()
                .map(|edit| SingleEditOperation::new(edit.new_range, edit.old_text.clone()))
                .collect();
            changes.push(self.apply_batch(inverse, ChangeSource::Undo)?);
        }

        let step = UndoStep {
            selections: group.selections_before.clone(),
            batches: changes,
        };
        self.redo_stack.push(group);
        Ok(Some(step))
    }

    pub fn redo(&mut self) -> Result<Option<UndoStep>> {
        self.group_open = false;
        let Some(group) = self.redo_stack.pop() else {
            return Ok(None);
        };

        let mut changes = Vec::new();
        for batch in &group.batches {
            let forward = batch
                .iter()
                .map(|edit| SingleEditOperation::new(edit.range, edit.text.clone()))
                .collect();
            changes.push(self.apply_batch(forward, ChangeSource::Redo)?);
        }

        let step = UndoStep {
            selections: group.selections_after.clone(),
            batches: changes,
        };
        self.undo_stack.push(group);
        Ok(Some(step))
    }

    fn apply_batch(
        &mut self,
        mut edits: Vec<SingleEditOperation>,
        source: ChangeSource,
    ) -> Result<Vec<AppliedEdit>> {
        if let Some(bad) = edits.iter().find(|edit| !edit.range.is_well_formed()) {
            return Err(EditorError::invalid(format!("malformed edit range {}", bad.range)));
        }
        for edit in &mut edits {
            edit.range = self.validate_range(edit.range);
        }
        edits.retain(|edit| !(edit.range.is_empty() && edit.text.is_empty()));
        if edits.is_empty() {
            return Ok(Vec::new());
        }
        if !sort_and_check_overlap(&mut edits, |edit| edit.range) {
            return Err(EditorError::invalid("overlapping edit ranges"));
        }

        let staged: Vec<(usize, usize, String)> = edits
            .iter()
            .map(|edit| {
                (
                    self.offset_at(edit.range.start),
                    self.offset_at(edit.range.end),
                    self.value_in_range(edit.range),
                )
            })
            .collect();

        for (edit, (start, end, _)) in edits.iter().zip(&staged).rev() {
            self.rope.remove(*start..*end);
            self.rope.insert(*start, &edit.text);
        }

        let mut shift: isize = 0;
        let mut applied = Vec::with_capacity(edits.len());
        for (edit, (start, end, old_text)) in edits.into_iter().zip(staged) {
            let new_start = start.saturating_add_signed(shift);
            let inserted = edit.text.chars().count();
            shift += inserted as isize - (end - start) as isize;
            applied.push(AppliedEdit {
                range: edit.range,
                new_range: Range::new(
                    self.position_at(new_start),
                    self.position_at(new_start + inserted),
                ),
                text: edit.text,
                old_text,
            });
        }

        self.version_id += 1;
        let decorations_moved = self.reanchor_decorations(&applied);

        self.emit(ModelEvent::ContentChanged(ContentChangedEvent {
            changes: applied.clone(),
            version_id: self.version_id,
            is_undoing: source == ChangeSource::Undo,
            is_redoing: source == ChangeSource::Redo,
            is_flush: false,
        }));
        if decorations_moved {
            self.emit(ModelEvent::DecorationsChanged);
        }
        Ok(applied)
    }

    fn reanchor_decorations(&mut self, applied: &[AppliedEdit]) -> bool {
        let mut moved = false;
        for decoration in self.decorations.values_mut() {
            let (start_affinity, end_affinity) = decoration.options.stickiness.edge_affinities();
            let start = adjust_position_after_edits(decoration.range.start, applied, start_affinity);
            let end = adjust_position_after_edits(decoration.range.end, applied, end_affinity);
            let range = Range::new(start, end.max(start));
            if range != decoration.range {
                decoration.range = range;
                moved = true;
            }
        }
        moved
    }

    // ==================== decorations ====================

    /// Runs `f` with an accessor scoped to `owner`; at most one
    /// `DecorationsChanged` event is emitted for the whole call.
    pub fn change_decorations<R>(
        &mut self,
        owner: OwnerId,
        f: impl FnOnce(&mut DecorationsAccessor<'_>) -> R,
    ) -> R {
        let mut accessor = DecorationsAccessor {
            rope: &self.rope,
            decorations: &mut self.decorations,
            owner,
            changed: false,
        };
        let out = f(&mut accessor);
        let changed = accessor.changed;
        if changed {
            self.emit(ModelEvent::DecorationsChanged);
        }
        out
    }

    /// Atomically replaces `old` with `new`, returning the new ids in input
    /// order. Unknown old ids are ignored.
    pub fn delta_decorations(
        &mut self,
        owner: OwnerId,
        old: &[DecorationId],
        new: &[DeltaDecoration],
    ) -> Vec<DecorationId> {
        self.change_decorations(owner, |accessor| accessor.delta_decorations(old, new))
    }

    pub fn decoration(&self, id: DecorationId) -> Option<&ModelDecoration> {
        self.decorations.get(id)
    }

    pub fn decoration_range(&self, id: DecorationId) -> Option<Range> {
        self.decorations.get(id).map(|decoration| decoration.range)
    }

    pub fn decoration_options(&self, id: DecorationId) -> Option<&ModelDecorationOptions> {
        self.decorations.get(id).map(|decoration| &decoration.options)
    }

    /// Decorations touching `line`, optionally filtered by owner, sorted by
    /// start then z-index.
    pub fn get_line_decorations(&self, line: usize, owner: Option<OwnerId>) -> Vec<ModelDecoration> {
        let mut out: Vec<ModelDecoration> = self
            .decorations
            .values()
            .filter(|decoration| owner.map_or(true, |owner| decoration.owner_id == owner))
            .filter(|decoration| decoration.range.touches_line(line))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then_with(|| a.options.z_index.cmp(&b.options.z_index))
        });
        out
    }

    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    pub fn owner_decoration_count(&self, owner: OwnerId) -> usize {
        self.decorations
            .values()
            .filter(|decoration| decoration.owner_id == owner)
            .count()
    }

    pub fn remove_all_decorations_with_owner(&mut self, owner: OwnerId) {
        let before = self.decorations.len();
        self.decorations.retain(|_, decoration| decoration.owner_id != owner);
        if self.decorations.len() != before {
            self.emit(ModelEvent::DecorationsChanged);
        }
    }

    // ==================== listeners / lifecycle ====================

    pub fn subscribe(&mut self) -> ModelSubscription {
        let (tx, rx) = mpsc::channel();
        let id = self.listeners.insert(tx);
        ModelSubscription { id, rx }
    }

    pub fn unsubscribe(&mut self, id: ModelListenerId) {
        self.listeners.remove(id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn on_before_attached(&mut self) {
        self.attached_editors += 1;
    }

    pub fn on_before_detached(&mut self) {
        self.attached_editors = self.attached_editors.saturating_sub(1);
    }

    pub fn attached_editors(&self) -> usize {
        self.attached_editors
    }

    /// Notifies subscribers, then drops every listener and decoration.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.emit(ModelEvent::WillDispose);
        self.disposed = true;
        self.listeners.clear();
        self.decorations.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn emit(&mut self, event: ModelEvent) {
        let mut closed = Vec::new();
        for (id, tx) in &self.listeners {
            if tx.send(event.clone()).is_err() {
                closed.push(id);
            }
        }
        for id in closed {
            self.listeners.remove(id);
        }
    }
}

/// Scoped decoration editing handed out by [`TextModel::change_decorations`].
pub struct DecorationsAccessor<'a> {
    rope: &'a Rope,
    decorations: &'a mut SlotMap<DecorationId, ModelDecoration>,
    owner: OwnerId,
    changed: bool,
}

impl DecorationsAccessor<'_> {
    pub fn add_decoration(&mut self, range: Range, options: ModelDecorationOptions) -> DecorationId {
        let range = validate_range_in(self.rope, range);
        let owner_id = self.owner;
        self.changed = true;
        self.decorations.insert_with_key(|id| ModelDecoration {
            id,
            owner_id,
            range,
            options,
        })
    }

    pub fn change_decoration(&mut self, id: DecorationId, range: Range) {
        let range = validate_range_in(self.rope, range);
        if let Some(decoration) = self.decorations.get_mut(id) {
            decoration.range = range;
            self.changed = true;
        }
    }

    pub fn change_decoration_options(&mut self, id: DecorationId, options: ModelDecorationOptions) {
        if let Some(decoration) = self.decorations.get_mut(id) {
            decoration.options = options;
            self.changed = true;
        }
    }

    pub fn remove_decoration(&mut self, id: DecorationId) {
        if self.decorations.remove(id).is_some() {
            self.changed = true;
        }
    }

    pub fn delta_decorations(&mut self, old: &[DecorationId], new: &[DeltaDecoration]) -> Vec<DecorationId> {
        for id in old {
            self.remove_decoration(*id);
        }
        new.iter()
            .map(|decoration| self.add_decoration(decoration.range, decoration.options.clone()))
            .collect()
    }
}

/// Borrows the slice as `&str` when it is contiguous.
pub fn slice_to_cow(slice: RopeSlice<'_>) -> Cow<'_, str> {
    match slice.as_str() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(slice.to_string()),
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

fn line_break_len(slice: RopeSlice<'_>) -> usize {
    let len = slice.len_chars();
    if len == 0 {
        return 0;
    }
    let last = slice.char(len - 1);
    if last == '\n' && len >= 2 && slice.char(len - 2) == '\r' {
        2
    } else if is_line_break(last) {
        1
    } else {
        0
    }
}

fn line_length_in(rope: &Rope, line: usize) -> usize {
    if line == 0 || line > rope.len_lines() {
        return 0;
    }
    let slice = rope.line(line - 1);
    slice.len_chars() - line_break_len(slice)
}

fn validate_position_in(rope: &Rope, pos: Position) -> Position {
    let line = pos.line.clamp(1, rope.len_lines().max(1));
    let column = pos.column.clamp(1, line_length_in(rope, line) + 1);
    Position::new(line, column)
}

fn validate_range_in(rope: &Rope, range: Range) -> Range {
    Range::new(
        validate_position_in(rope, range.start),
        validate_position_in(rope, range.end),
    )
}

fn offset_in(rope: &Rope, pos: Position) -> usize {
    let pos = validate_position_in(rope, pos);
    rope.line_to_char(pos.line - 1) + pos.column - 1
}

#[cfg(test)]
#[path = "../../tests/unit/models/text_model.rs"]
mod tests;
