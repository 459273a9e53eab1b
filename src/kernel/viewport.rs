//! Scroll and reveal geometry in view-line space.
//!
//! Everything here works on view lines (after wrapping and hiding) and pixel
//! offsets derived from `line_height` and `column_width`. Mapping model
//! positions to view positions is the converter's job.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::core::event::ScrollEvent;

use super::config::EditorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VerticalRevealType {
    #[default]
    Simple,
    Center,
    CenterIfOutsideViewport,
    Top,
}

/// Position relative to the top-left corner of the viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisiblePosition {
    pub top: i64,
    pub left: i64,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    pub scroll_top: u32,
    pub scroll_left: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLayout {
    line_height: u32,
    column_width: u32,
    width: u32,
    height: u32,
    scroll_top: u32,
    scroll_left: u32,
    scroll_beyond_last_line: bool,
}

impl ViewLayout {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            line_height: config.line_height.max(1),
            column_width: config.column_width.max(1),
            width: config.viewport_width,
            height: config.viewport_height,
            scroll_top: 0,
            scroll_left: 0,
            scroll_beyond_last_line: config.scroll_beyond_last_line,
        }
    }

    pub fn line_height(&self) -> u32 {
        self.line_height
    }

    pub fn column_width(&self) -> u32 {
        self.column_width
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    pub fn scroll_left(&self) -> u32 {
        self.scroll_left
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            scroll_top: self.scroll_top,
            scroll_left: self.scroll_left,
        }
    }

    /// Returns `true` when the dimensions actually changed.
    pub fn set_dimensions(&mut self, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn content_height(&self, view_line_count: usize) -> u32 {
        (view_line_count as u32).saturating_mul(self.line_height)
    }

    pub fn scroll_height(&self, view_line_count: usize) -> u32 {
        let mut height = self.content_height(view_line_count);
        if self.scroll_beyond_last_line {
            height = height.saturating_add(self.height.saturating_sub(self.line_height));
        }
        height.max(self.height)
    }

    /// `max_visible_width` is the widest view line in visible columns.
    pub fn scroll_width(&self, max_visible_width: usize) -> u32 {
        let content = (max_visible_width as u32)
            .saturating_add(1)
            .saturating_mul(self.column_width);
        content.max(self.width)
    }

    pub fn max_scroll_top(&self, view_line_count: usize) -> u32 {
        self.scroll_height(view_line_count).saturating_sub(self.height)
    }

    pub fn max_scroll_left(&self, max_visible_width: usize) -> u32 {
        self.scroll_width(max_visible_width).saturating_sub(self.width)
    }

    /// Clamps and applies a new scroll position. `None` keeps an axis as is.
    pub fn set_scroll_position(
        &mut self,
        scroll_top: Option<u32>,
        scroll_left: Option<u32>,
        view_line_count: usize,
        max_visible_width: usize,
    ) -> ScrollEvent {
        let top = scroll_top
            .unwrap_or(self.scroll_top)
            .min(self.max_scroll_top(view_line_count));
        let left = scroll_left
            .unwrap_or(self.scroll_left)
            .min(self.max_scroll_left(max_visible_width));

        let event = ScrollEvent {
            scroll_top: top,
            scroll_left: left,
            scroll_width: self.scroll_width(max_visible_width),
            scroll_height: self.scroll_height(view_line_count),
            scroll_top_changed: top != self.scroll_top,
            scroll_left_changed: left != self.scroll_left,
        };
        self.scroll_top = top;
        self.scroll_left = left;
        event
    }

    pub fn top_for_view_line(&self, view_line: usize) -> u32 {
        (view_line.saturating_sub(1) as u32).saturating_mul(self.line_height)
    }

    pub fn left_for_visible_column(&self, visible_column: usize) -> u32 {
        (visible_column as u32).saturating_mul(self.column_width)
    }

    /// View lines that are at least partially inside the viewport.
    pub fn visible_view_lines(&self, view_line_count: usize) -> RangeInclusive<usize> {
        let count = view_line_count.max(1);
        let first = (self.scroll_top / self.line_height) as usize + 1;
        let bottom = self.scroll_top.saturating_add(self.height.max(1));
        let last = bottom.div_ceil(self.line_height) as usize;
        first.min(count)..=last.clamp(first, count).min(count)
    }

    /// Scroll top that brings view lines `start..=end` into the viewport.
    pub fn reveal_top(&self, start: usize, end: usize, reveal: VerticalRevealType) -> u32 {
        let box_top = self.top_for_view_line(start);
        let box_bottom = self.top_for_view_line(end).saturating_add(self.line_height);
        let viewport_top = self.scroll_top;
        let viewport_bottom = viewport_top.saturating_add(self.height);
        let fully_visible = box_top >= viewport_top && box_bottom <= viewport_bottom;
        let centered = || (box_top + box_bottom).saturating_sub(self.height) / 2;

        match reveal {
            VerticalRevealType::Top => box_top,
            VerticalRevealType::Center => centered(),
            VerticalRevealType::CenterIfOutsideViewport if fully_visible => viewport_top,
            VerticalRevealType::CenterIfOutsideViewport => centered(),
            VerticalRevealType::Simple if fully_visible => viewport_top,
            VerticalRevealType::Simple => {
                if box_top < viewport_top || box_bottom - box_top > self.height {
                    box_top
                } else {
                    box_bottom.saturating_sub(self.height)
                }
            }
        }
    }

    /// Scroll left that brings visible columns `start..=end` into view.
    pub fn reveal_left(&self, start: usize, end: usize) -> u32 {
        let box_left = self.left_for_visible_column(start);
        let box_right = self.left_for_visible_column(end).saturating_add(self.column_width);
        let viewport_left = self.scroll_left;
        let viewport_right = viewport_left.saturating_add(self.width);

        if box_left >= viewport_left && box_right <= viewport_right {
            viewport_left
        } else if box_left < viewport_left || box_right - box_left > self.width {
            box_left
        } else {
            box_right.saturating_sub(self.width)
        }
    }

    pub fn visible_position(&self, view_line: usize, visible_column: usize) -> VisiblePosition {
        VisiblePosition {
            top: i64::from(self.top_for_view_line(view_line)) - i64::from(self.scroll_top),
            left: i64::from(self.left_for_visible_column(visible_column))
                - i64::from(self.scroll_left),
            height: self.line_height,
        }
    }

    /// View line and nearest visible column under a client point, or `None`
    /// when the point lies outside the viewport.
    pub fn hit_test(&self, x: u32, y: u32) -> Option<(usize, usize)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let view_line = (self.scroll_top.saturating_add(y) / self.line_height) as usize + 1;
        let abs_x = self.scroll_left.saturating_add(x);
        let visible_column = (abs_x.saturating_add(self.column_width / 2) / self.column_width) as usize;
        Some((view_line, visible_column))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/viewport.rs"]
mod tests;
