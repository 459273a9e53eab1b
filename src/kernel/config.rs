//! Per-editor configuration, loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EditorError, Result};

/// Upper bound on simultaneous cursors unless configured otherwise.
pub const DEFAULT_MAX_CURSOR_COUNT: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub read_only: bool,
    pub max_cursor_count: usize,
    /// Soft-wrap width in visible columns; 0 disables wrapping.
    pub wrapping_column: usize,
    pub line_height: u32,
    pub column_width: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub scroll_beyond_last_line: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            max_cursor_count: DEFAULT_MAX_CURSOR_COUNT,
            wrapping_column: 0,
            line_height: 18,
            column_width: 8,
            viewport_width: 800,
            viewport_height: 600,
            scroll_beyond_last_line: true,
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cursor_count == 0 {
            return Err(EditorError::Config("max_cursor_count must be at least 1".into()));
        }
        if self.line_height == 0 || self.column_width == 0 {
            return Err(EditorError::Config(
                "line_height and column_width must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/config.rs"]
mod tests;
