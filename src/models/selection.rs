//! Selection model: an anchor and an active end.

use super::position::{Position, Range};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionDirection {
    /// Active end is at or after the anchor.
    Ltr,
    /// Active end is before the anchor.
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    anchor: Position,
    active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    pub fn caret(pos: Position) -> Self {
        Self::new(pos, pos)
    }

    pub fn from_range(range: Range, direction: SelectionDirection) -> Self {
        match direction {
            SelectionDirection::Ltr => Self::new(range.start, range.end),
            SelectionDirection::Rtl => Self::new(range.end, range.start),
        }
    }

    pub fn from_coords(anchor_line: usize, anchor_col: usize, line: usize, col: usize) -> Self {
        Self::new(
            Position::new(anchor_line, anchor_col),
            Position::new(line, col),
        )
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }

    pub fn active(&self) -> Position {
        self.active
    }

    /// Caret position, i.e. the active end.
    pub fn position(&self) -> Position {
        self.active
    }

    pub fn direction(&self) -> SelectionDirection {
        if self.active >= self.anchor {
            SelectionDirection::Ltr
        } else {
            SelectionDirection::Rtl
        }
    }

    pub fn range(&self) -> Range {
        Range::new(self.anchor, self.active)
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    pub fn is_well_formed(&self) -> bool {
        self.anchor.is_well_formed() && self.active.is_well_formed()
    }

    /// Half-open, so a caret at `end` is outside.
    pub fn contains(&self, pos: Position) -> bool {
        let range = self.range();
        range.start <= pos && pos < range.end
    }

    pub fn with_active(self, active: Position) -> Self {
        Self { active, ..self }
    }

    pub fn collapse(self) -> Self {
        Self::caret(self.active)
    }

    pub fn map(self, mut f: impl FnMut(Position) -> Position) -> Self {
        Self::new(f(self.anchor), f(self.active))
    }
}

impl From<Range> for Selection {
    fn from(range: Range) -> Self {
        Selection::from_range(range, SelectionDirection::Ltr)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/selection.rs"]
mod tests;
