//! Buffer edits and position re-anchoring.

use super::position::{Position, Range};
use ropey::str_utils;
use serde::{Deserialize, Serialize};

/// One replacement: `range` is replaced by `text`. An empty range inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleEditOperation {
    pub range: Range,
    pub text: String,
}

impl SingleEditOperation {
    pub fn new(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(pos: Position, text: impl Into<String>) -> Self {
        Self::new(Range::empty(pos), text)
    }

    pub fn delete(range: Range) -> Self {
        Self::new(range, String::new())
    }
}

/// An edit as it landed in the buffer.
///
/// `range` is in the coordinates before the batch, `new_range` in the
/// coordinates after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedEdit {
    pub range: Range,
    pub new_range: Range,
    pub text: String,
    pub old_text: String,
}

/// Which side of an insertion a tracked position sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affinity {
    /// Stays in front of text inserted exactly at the position.
    Before,
    /// Moves past text inserted exactly at the position.
    After,
}

/// Position right after `text` once it is inserted at `start`.
pub fn end_of_insert(start: Position, text: &str) -> Position {
    let chars = text.chars().count();
    let breaks = str_utils::char_to_line_idx(text, chars);
    let last_len = chars - str_utils::line_to_char_idx(text, breaks);
    if breaks == 0 {
        Position::new(start.line, start.column + last_len)
    } else {
        Position::new(start.line + breaks, last_len + 1)
    }
}

/// Maps `pos` through one replacement of `range` by `text`.
///
/// A position inside the replaced range collapses onto the start or the end of
/// the inserted text, depending on `affinity`.
pub fn adjust_position_after_edit(
    pos: Position,
    range: Range,
    text: &str,
    affinity: Affinity,
) -> Position {
    let Range { start, end } = range;
    if pos < start {
        return pos;
    }

    let inserted_end = end_of_insert(start, text);
    if pos == start || pos < end {
        return match affinity {
            Affinity::Before => start,
            Affinity::After => inserted_end,
        };
    }

    if pos.line == end.line {
        Position::new(
            inserted_end.line,
            inserted_end.column + (pos.column - end.column),
        )
    } else {
        Position::new(pos.line - end.line + inserted_end.line, pos.column)
    }
}

/// Maps `pos` through a batch sorted by `range.start` in pre-batch
/// coordinates. Walking the batch back to front keeps every earlier range
/// valid while later ones are applied.
pub fn adjust_position_after_edits(
    pos: Position,
    edits: &[AppliedEdit],
    affinity: Affinity,
) -> Position {
    edits.iter().rev().fold(pos, |pos, edit| {
        adjust_position_after_edit(pos, edit.range, &edit.text, affinity)
    })
}

/// Sorts a batch by start and rejects overlapping ranges. Empty ranges may
/// touch a neighbour; two edits may not share any covered character.
pub fn sort_and_check_overlap<T>(items: &mut [T], range_of: impl Fn(&T) -> Range) -> bool {
    items.sort_by(|a, b| {
        let (a, b) = (range_of(a), range_of(b));
        a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end))
    });
    items
        .windows(2)
        .all(|pair| range_of(&pair[0]).end <= range_of(&pair[1]).start)
}

#[cfg(test)]
#[path = "../../tests/unit/models/edit_op.rs"]
mod tests;
