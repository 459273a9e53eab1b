//! Editor commands: a closed set of handler kinds plus a name lookup table.
//!
//! `trigger` accepts either a typed `EditorCommand` or a handler id with a JSON
//! payload; ids that are not in the table (and not registered actions) are
//! ignored so newer hosts can send commands older editors do not know.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::models::{AppliedEdit, Selection, SingleEditOperation, TextModel};

/// Host-supplied edit, run against one selection.
pub trait EditCommand {
    fn edit_operations(&self, model: &TextModel, selection: &Selection) -> Vec<SingleEditOperation>;

    /// Selection after the edits were applied; `None` tracks the old one.
    fn compute_cursor_state(
        &self,
        _model: &TextModel,
        _applied: &[AppliedEdit],
        _selection: &Selection,
    ) -> Option<Selection> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorDirection {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

#[derive(Clone)]
pub enum EditorCommand {
    Type {
        text: String,
    },
    ReplacePreviousChar {
        text: String,
        replace_char_count: usize,
    },
    Paste {
        text: String,
        paste_on_new_line: bool,
        multicursor_text: Option<Vec<String>>,
    },
    Cut,
    CompositionStart,
    CompositionEnd,
    ExecuteCommand(Rc<dyn EditCommand>),
    ExecuteCommands(Vec<Option<Rc<dyn EditCommand>>>),
    Undo,
    Redo,
    CursorMove {
        direction: CursorDirection,
        select: bool,
    },
    SelectAll,
    AddCursorAbove,
    AddCursorBelow,
    RemoveSecondaryCursors,
    /// Anything outside the table; resolved against registered actions.
    Custom(String),
}

const CURSOR_MOVES: &[(&str, CursorDirection, bool)] = &[
    ("cursorLeft", CursorDirection::Left, false),
    ("cursorRight", CursorDirection::Right, false),
    ("cursorUp", CursorDirection::Up, false),
    ("cursorDown", CursorDirection::Down, false),
    ("cursorHome", CursorDirection::Home, false),
    ("cursorEnd", CursorDirection::End, false),
    ("cursorLeftSelect", CursorDirection::Left, true),
    ("cursorRightSelect", CursorDirection::Right, true),
    ("cursorUpSelect", CursorDirection::Up, true),
    ("cursorDownSelect", CursorDirection::Down, true),
    ("cursorHomeSelect", CursorDirection::Home, true),
    ("cursorEndSelect", CursorDirection::End, true),
];

impl EditorCommand {
    pub fn name(&self) -> &str {
        match self {
            EditorCommand::Type { .. } => "type",
            EditorCommand::ReplacePreviousChar { .. } => "replacePreviousChar",
            EditorCommand::Paste { .. } => "paste",
            EditorCommand::Cut => "cut",
            EditorCommand::CompositionStart => "compositionStart",
            EditorCommand::CompositionEnd => "compositionEnd",
            EditorCommand::ExecuteCommand(_) => "executeCommand",
            EditorCommand::ExecuteCommands(_) => "executeCommands",
            EditorCommand::Undo => "undo",
            EditorCommand::Redo => "redo",
            EditorCommand::CursorMove { direction, select } => CURSOR_MOVES
                .iter()
                .find(|(_, d, s)| d == direction && s == select)
                .map(|(name, _, _)| *name)
                .unwrap_or("cursorMove"),
            EditorCommand::SelectAll => "selectAll",
            EditorCommand::AddCursorAbove => "addCursorAbove",
            EditorCommand::AddCursorBelow => "addCursorBelow",
            EditorCommand::RemoveSecondaryCursors => "removeSecondaryCursors",
            EditorCommand::Custom(name) => name,
        }
    }

    /// Looks up a handler id. Payload fields follow the host protocol
    /// (`text`, `pasteOnNewLine`, `multicursorText`, `replaceCharCnt`).
    /// Unknown ids become `Custom`; malformed payloads return `None`.
    pub fn from_name(name: &str, payload: &Value) -> Option<Self> {
        let text = || payload.get("text").and_then(Value::as_str).map(str::to_string);

        let command = match name {
            "type" => EditorCommand::Type { text: text()? },
            "replacePreviousChar" => EditorCommand::ReplacePreviousChar {
                text: text()?,
                replace_char_count: payload
                    .get("replaceCharCnt")
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as usize,
            },
            "paste" => EditorCommand::Paste {
                text: text()?,
                paste_on_new_line: payload
                    .get("pasteOnNewLine")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                multicursor_text: payload
                    .get("multicursorText")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect()
                    }),
            },
            "cut" => EditorCommand::Cut,
            "compositionStart" => EditorCommand::CompositionStart,
            "compositionEnd" => EditorCommand::CompositionEnd,
            "undo" => EditorCommand::Undo,
            "redo" => EditorCommand::Redo,
            "selectAll" => EditorCommand::SelectAll,
            "addCursorAbove" => EditorCommand::AddCursorAbove,
            "addCursorBelow" => EditorCommand::AddCursorBelow,
            "removeSecondaryCursors" => EditorCommand::RemoveSecondaryCursors,
            // Commands carrying host objects cannot come through the named path.
            "executeCommand" | "executeCommands" => return None,
            other => match CURSOR_MOVES.iter().find(|(n, _, _)| *n == other) {
                Some((_, direction, select)) => EditorCommand::CursorMove {
                    direction: *direction,
                    select: *select,
                },
                None => EditorCommand::Custom(other.to_string()),
            },
        };
        Some(command)
    }

    pub fn is_edit_command(&self) -> bool {
        matches!(
            self,
            EditorCommand::Type { .. }
                | EditorCommand::ReplacePreviousChar { .. }
                | EditorCommand::Paste { .. }
                | EditorCommand::Cut
                | EditorCommand::ExecuteCommand(_)
                | EditorCommand::ExecuteCommands(_)
        )
    }

    pub fn is_cursor_command(&self) -> bool {
        matches!(
            self,
            EditorCommand::CursorMove { .. }
                | EditorCommand::SelectAll
                | EditorCommand::AddCursorAbove
                | EditorCommand::AddCursorBelow
                | EditorCommand::RemoveSecondaryCursors
        )
    }
}

impl fmt::Debug for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorCommand::Type { text } => f.debug_struct("Type").field("text", text).finish(),
            EditorCommand::ReplacePreviousChar {
                text,
                replace_char_count,
            } => f
                .debug_struct("ReplacePreviousChar")
                .field("text", text)
                .field("replace_char_count", replace_char_count)
                .finish(),
            EditorCommand::Paste {
                text,
                paste_on_new_line,
                multicursor_text,
            } => f
                .debug_struct("Paste")
                .field("text", text)
                .field("paste_on_new_line", paste_on_new_line)
                .field("multicursor_text", multicursor_text)
                .finish(),
            EditorCommand::ExecuteCommands(commands) => f
                .debug_tuple("ExecuteCommands")
                .field(&commands.len())
                .finish(),
            EditorCommand::CursorMove { direction, select } => f
                .debug_struct("CursorMove")
                .field("direction", direction)
                .field("select", select)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/command.rs"]
mod tests;
