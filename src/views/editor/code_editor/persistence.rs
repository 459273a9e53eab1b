use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CodeEditor;
use crate::core::error::Result;
use crate::core::event::CursorChangeReason;
use crate::kernel::cursor::SavedCursorState;
use crate::kernel::viewport::ScrollState;

/// Everything needed to bring an editor back to where the user left it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewState {
    pub cursor_state: SavedCursorState,
    pub view_state: ScrollState,
    pub contributions_state: BTreeMap<String, Value>,
}

impl ViewState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

impl CodeEditor {
    /// `None` when no model is attached.
    pub fn save_view_state(&mut self) -> Option<ViewState> {
        self.sync_with_model();
        let att = self.attachment.as_ref()?;
        let contributions_state = self
            .contributions
            .iter()
            .filter_map(|contribution| {
                contribution
                    .save_view_state()
                    .map(|state| (contribution.id().to_string(), state))
            })
            .collect();
        Some(ViewState {
            cursor_state: SavedCursorState::Many(att.cursor.save_state()),
            view_state: att.layout.scroll_state(),
            contributions_state,
        })
    }

    /// Restores cursors, then scroll position, then contribution state.
    pub fn restore_view_state(&mut self, state: &ViewState) -> Result<()> {
        self.sync_with_model();
        if !self.has_model() {
            return Ok(());
        }
        let snapshots = state.cursor_state.clone().into_vec();
        let update = self.cursor_op(|cursor, model, _| cursor.restore_state(model, &snapshots))??;
        self.queue_cursor_events(update, CursorChangeReason::NotSet, "restoreState", true);
        self.flush_events();

        self.set_scroll_position(
            Some(state.view_state.scroll_top),
            Some(state.view_state.scroll_left),
        );

        for contribution in &mut self.contributions {
            if let Some(saved) = state.contributions_state.get(contribution.id()) {
                contribution.restore_view_state(saved);
            }
        }
        Ok(())
    }
}
