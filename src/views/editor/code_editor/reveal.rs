use super::CodeEditor;
use crate::core::error::{EditorError, Result};
use crate::core::event::EditorEvent;
use crate::kernel::converter::{column_from_visible_column, visible_column};
use crate::kernel::viewport::{VerticalRevealType, VisiblePosition};
use crate::models::{Position, Range};
use crate::views::view::{MouseTarget, MouseTargetType};

fn check_line(line: usize) -> Result<()> {
    if line == 0 {
        return Err(EditorError::invalid("line numbers start at 1"));
    }
    Ok(())
}

fn check_position(position: Position) -> Result<()> {
    if !position.is_well_formed() {
        return Err(EditorError::invalid(format!("malformed position {position}")));
    }
    Ok(())
}

fn check_range(range: Range) -> Result<()> {
    if !range.is_well_formed() {
        return Err(EditorError::invalid(format!("malformed range {range}")));
    }
    Ok(())
}

impl CodeEditor {
    /// Scrolls so that `range` is visible. Horizontal scrolling only applies
    /// to ranges within one view line.
    fn reveal(&mut self, range: Range, reveal: VerticalRevealType, horizontal: bool) {
        self.sync_with_model();
        let Some(att) = self.attachment.as_mut() else {
            return;
        };
        let event = {
            let model = att.model.borrow();
            let range = model.validate_range(range);
            let start = att.converter.model_to_view(&model, range.start);
            let end = att.converter.model_to_view(&model, range.end);
            let top = att.layout.reveal_top(start.line, end.line, reveal);
            let view_lines = att.converter.view_line_count(&model);

            let left = if horizontal && view_lines > 0 && start.line == end.line {
                let content = att.converter.view_line_content(&model, start.line);
                let tab_size = model.options().tab_size;
                let from = visible_column(&content, start.column, tab_size);
                let to = visible_column(&content, end.column, tab_size);
                Some(att.layout.reveal_left(from, to))
            } else {
                None
            };

            let width = att.converter.max_view_line_width(&model);
            att.layout.set_scroll_position(Some(top), left, view_lines, width)
        };
        if event.scroll_top_changed || event.scroll_left_changed {
            self.queue(EditorEvent::ScrollChanged(event));
        }
        self.flush_events();
    }

    pub(super) fn reveal_primary_cursor(&mut self) {
        if let Some(position) = self.position() {
            self.reveal(Range::empty(position), VerticalRevealType::Simple, true);
        }
    }

    /// Re-applies the scroll bounds after content, size or hidden areas change.
    pub(super) fn clamp_scroll(&mut self) {
        let Some(att) = self.attachment.as_mut() else {
            return;
        };
        let event = {
            let model = att.model.borrow();
            let view_lines = att.converter.view_line_count(&model);
            let width = att.converter.max_view_line_width(&model);
            att.layout.set_scroll_position(None, None, view_lines, width)
        };
        if event.scroll_top_changed || event.scroll_left_changed {
            self.queue(EditorEvent::ScrollChanged(event));
        }
    }

    // ==================== reveal ====================

    pub fn reveal_line(&mut self, line: usize) -> Result<()> {
        self.reveal_lines_with(line, line, VerticalRevealType::Simple)
    }

    pub fn reveal_line_in_center(&mut self, line: usize) -> Result<()> {
        self.reveal_lines_with(line, line, VerticalRevealType::Center)
    }

    pub fn reveal_line_in_center_if_outside_viewport(&mut self, line: usize) -> Result<()> {
        self.reveal_lines_with(line, line, VerticalRevealType::CenterIfOutsideViewport)
    }

    pub fn reveal_line_at_top(&mut self, line: usize) -> Result<()> {
        self.reveal_lines_with(line, line, VerticalRevealType::Top)
    }

    pub fn reveal_lines(&mut self, start: usize, end: usize) -> Result<()> {
        self.reveal_lines_with(start, end, VerticalRevealType::Simple)
    }

    pub fn reveal_lines_in_center(&mut self, start: usize, end: usize) -> Result<()> {
        self.reveal_lines_with(start, end, VerticalRevealType::Center)
    }

    pub fn reveal_lines_in_center_if_outside_viewport(&mut self, start: usize, end: usize) -> Result<()> {
        self.reveal_lines_with(start, end, VerticalRevealType::CenterIfOutsideViewport)
    }

    pub fn reveal_lines_at_top(&mut self, start: usize, end: usize) -> Result<()> {
        self.reveal_lines_with(start, end, VerticalRevealType::Top)
    }

    pub fn reveal_lines_with(&mut self, start: usize, end: usize, reveal: VerticalRevealType) -> Result<()> {
        check_line(start)?;
        check_line(end)?;
        let range = Range::from_coords(start, 1, end.max(start), 1);
        self.reveal(range, reveal, false);
        Ok(())
    }

    pub fn reveal_position(&mut self, position: Position) -> Result<()> {
        self.reveal_position_with(position, VerticalRevealType::Simple)
    }

    pub fn reveal_position_in_center(&mut self, position: Position) -> Result<()> {
        self.reveal_position_with(position, VerticalRevealType::Center)
    }

    pub fn reveal_position_in_center_if_outside_viewport(&mut self, position: Position) -> Result<()> {
        self.reveal_position_with(position, VerticalRevealType::CenterIfOutsideViewport)
    }

    pub fn reveal_position_at_top(&mut self, position: Position) -> Result<()> {
        self.reveal_position_with(position, VerticalRevealType::Top)
    }

    pub fn reveal_position_with(&mut self, position: Position, reveal: VerticalRevealType) -> Result<()> {
        check_position(position)?;
        self.reveal(Range::empty(position), reveal, true);
        Ok(())
    }

    pub fn reveal_range(&mut self, range: Range) -> Result<()> {
        self.reveal_range_with(range, VerticalRevealType::Simple)
    }

    pub fn reveal_range_in_center(&mut self, range: Range) -> Result<()> {
        self.reveal_range_with(range, VerticalRevealType::Center)
    }

    pub fn reveal_range_in_center_if_outside_viewport(&mut self, range: Range) -> Result<()> {
        self.reveal_range_with(range, VerticalRevealType::CenterIfOutsideViewport)
    }

    pub fn reveal_range_at_top(&mut self, range: Range) -> Result<()> {
        self.reveal_range_with(range, VerticalRevealType::Top)
    }

    pub fn reveal_range_with(&mut self, range: Range, reveal: VerticalRevealType) -> Result<()> {
        check_range(range)?;
        self.reveal(range, reveal, true);
        Ok(())
    }

    // ==================== scrolling ====================

    pub fn scroll_top(&self) -> u32 {
        self.attachment.as_ref().map_or(0, |att| att.layout.scroll_top())
    }

    pub fn scroll_left(&self) -> u32 {
        self.attachment.as_ref().map_or(0, |att| att.layout.scroll_left())
    }

    pub fn scroll_height(&self) -> u32 {
        self.attachment.as_ref().map_or(0, |att| {
            let model = att.model.borrow();
            att.layout.scroll_height(att.converter.view_line_count(&model))
        })
    }

    pub fn scroll_width(&self) -> u32 {
        self.attachment.as_ref().map_or(0, |att| {
            let model = att.model.borrow();
            att.layout.scroll_width(att.converter.max_view_line_width(&model))
        })
    }

    pub fn set_scroll_top(&mut self, scroll_top: u32) {
        self.set_scroll_position(Some(scroll_top), None);
    }

    pub fn set_scroll_left(&mut self, scroll_left: u32) {
        self.set_scroll_position(None, Some(scroll_left));
    }

    /// Values beyond the scrollable area are clamped.
    pub fn set_scroll_position(&mut self, scroll_top: Option<u32>, scroll_left: Option<u32>) {
        self.sync_with_model();
        let Some(att) = self.attachment.as_mut() else {
            return;
        };
        let event = {
            let model = att.model.borrow();
            let view_lines = att.converter.view_line_count(&model);
            let width = att.converter.max_view_line_width(&model);
            att.layout.set_scroll_position(scroll_top, scroll_left, view_lines, width)
        };
        if event.scroll_top_changed || event.scroll_left_changed {
            self.queue(EditorEvent::ScrollChanged(event));
        }
        self.flush_events();
    }

    // ==================== geometry ====================

    /// Model ranges currently inside the viewport, split at hidden areas.
    pub fn visible_ranges(&self) -> Vec<Range> {
        let Some(att) = self.attachment.as_ref() else {
            return Vec::new();
        };
        let model = att.model.borrow();
        let view_lines = att.converter.view_line_count(&model);
        if view_lines == 0 {
            return Vec::new();
        }
        let visible = att.layout.visible_view_lines(view_lines);
        let start = att.converter.view_to_model(&model, Position::new(*visible.start(), 1));
        let end = att
            .converter
            .view_to_model(&model, Position::new(*visible.end(), usize::MAX));

        att.converter
            .visible_line_ranges(&model)
            .into_iter()
            .filter(|lines| *lines.end() >= start.line && *lines.start() <= end.line)
            .map(|lines| {
                let from = if *lines.start() <= start.line {
                    start
                } else {
                    Position::new(*lines.start(), 1)
                };
                let to = if *lines.end() >= end.line {
                    end
                } else {
                    Position::new(*lines.end(), model.line_max_column(*lines.end()))
                };
                Range::new(from, to)
            })
            .collect()
    }

    /// Vertical offset of a model line from the top of the content.
    pub fn top_for_line_number(&self, line: usize) -> u32 {
        self.top_for_position(Position::new(line.max(1), 1))
    }

    pub fn top_for_position(&self, position: Position) -> u32 {
        self.attachment.as_ref().map_or(0, |att| {
            let model = att.model.borrow();
            let view = att.converter.model_to_view(&model, position);
            att.layout.top_for_view_line(view.line)
        })
    }

    /// Horizontal offset of `column` within its view line.
    pub fn offset_for_column(&self, line: usize, column: usize) -> u32 {
        self.attachment.as_ref().map_or(0, |att| {
            let model = att.model.borrow();
            let view = att
                .converter
                .model_to_view(&model, Position::new(line.max(1), column.max(1)));
            let content = att.converter.view_line_content(&model, view.line);
            let visible = visible_column(&content, view.column, model.options().tab_size);
            att.layout.left_for_visible_column(visible)
        })
    }

    /// 1-based visible column of `position`, with tabs expanded.
    pub fn visible_column_from_position(&self, position: Position) -> usize {
        self.attachment.as_ref().map_or(0, |att| {
            let model = att.model.borrow();
            let position = model.validate_position(position);
            let content = model.line_content(position.line);
            visible_column(&content, position.column, model.options().tab_size) + 1
        })
    }

    /// Where `position` is drawn relative to the viewport. `None` without a
    /// real view.
    pub fn scrolled_visible_position(&self, position: Position) -> Option<VisiblePosition> {
        let att = self.attachment.as_ref()?;
        att.view.as_ref()?;
        let model = att.model.borrow();
        let view = att.converter.model_to_view(&model, position);
        let content = att.converter.view_line_content(&model, view.line);
        let visible = visible_column(&content, view.column, model.options().tab_size);
        Some(att.layout.visible_position(view.line, visible))
    }

    /// Hit-tests a point relative to the viewport. `None` without a real view
    /// or outside the viewport.
    pub fn target_at_client_point(&self, x: u32, y: u32) -> Option<MouseTarget> {
        let att = self.attachment.as_ref()?;
        att.view.as_ref()?;
        let (view_line, visible) = att.layout.hit_test(x, y)?;
        let model = att.model.borrow();
        let view_lines = att.converter.view_line_count(&model);
        let tab_size = model.options().tab_size;

        if view_lines == 0 || view_line > view_lines {
            let end = model.full_range().end;
            return Some(MouseTarget {
                kind: MouseTargetType::ContentEmpty,
                position: end,
                range: Range::empty(end),
            });
        }

        let content = att.converter.view_line_content(&model, view_line);
        let line_width = visible_column(&content, content.chars().count() + 1, tab_size);
        let column = column_from_visible_column(&content, visible, tab_size);
        let position = att
            .converter
            .view_to_model(&model, Position::new(view_line, column));
        let kind = if visible > line_width {
            MouseTargetType::ContentEmpty
        } else {
            MouseTargetType::ContentText
        };
        Some(MouseTarget {
            kind,
            position,
            range: Range::empty(position),
        })
    }

    /// Hides every line touched by `ranges`; replaces the previous set.
    pub fn set_hidden_areas(&mut self, ranges: &[Range]) -> Result<()> {
        if let Some(bad) = ranges.iter().find(|range| !range.is_well_formed()) {
            return Err(EditorError::invalid(format!("malformed range {bad}")));
        }
        self.sync_with_model();
        if let Some(att) = self.attachment.as_mut() {
            att.converter.set_hidden_areas(ranges);
        }
        self.clamp_scroll();
        self.flush_events();
        Ok(())
    }
}
