//! Model <-> view coordinate conversion.
//!
//! A view line is either a whole model line or one soft-wrapped segment of
//! it. Hidden model lines produce no view lines at all. The line mapping is
//! built lazily and rebuilt whenever the model version, the tab size, the
//! hidden areas or the wrapping column change.

use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::rc::Rc;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::models::{Position, Range, TextModel};

/// Visible width of the text before `column` (1-based, in chars), with tabs
/// expanded to the next multiple of `tab_size` and wide chars counted as 2.
pub fn visible_column(line_content: &str, column: usize, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    let mut visible = 0usize;
    let mut chars_seen = 0usize;
    for g in line_content.graphemes(true) {
        if chars_seen + 1 >= column {
            break;
        }
        chars_seen += g.chars().count();
        visible = advance(visible, g, tab_size);
    }
    visible
}

/// Inverse of [`visible_column`]: the column whose left edge is closest to
/// `visible`, never splitting a grapheme.
pub fn column_from_visible_column(line_content: &str, visible: usize, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    let mut current = 0usize;
    let mut column = 1usize;
    for g in line_content.graphemes(true) {
        let next = advance(current, g, tab_size);
        if next > visible {
            if visible - current > next - visible {
                column += g.chars().count();
            }
            return column;
        }
        current = next;
        column += g.chars().count();
    }
    column
}

fn advance(visible: usize, grapheme: &str, tab_size: usize) -> usize {
    if grapheme == "\t" {
        visible + tab_size - visible % tab_size
    } else {
        visible + grapheme.width()
    }
}

/// Start columns of each wrapped segment of `line`; always begins with 1.
fn wrap_points(line: &str, wrapping_column: usize, tab_size: usize) -> Vec<usize> {
    let mut starts = vec![1];
    if wrapping_column == 0 {
        return starts;
    }

    let mut visible = 0usize;
    let mut segment_start_visible = 0usize;
    let mut column = 1usize;
    for g in line.graphemes(true) {
        let next = advance(visible, g, tab_size.max(1));
        if next - segment_start_visible > wrapping_column && visible > segment_start_visible {
            starts.push(column);
            segment_start_visible = visible;
        }
        visible = next;
        column += g.chars().count();
    }
    starts
}

#[derive(Debug)]
struct LineMapping {
    version: u64,
    tab_size: usize,
    /// Wrap segment start columns per model line; empty when hidden.
    segments: Vec<Vec<usize>>,
    /// First view line (1-based) of each model line. Hidden lines share the
    /// value of the next visible line.
    first_view_line: Vec<usize>,
    view_line_count: usize,
}

#[derive(Debug, Default)]
pub struct CoordinatesConverter {
    /// Sorted, merged, 1-based inclusive line ranges.
    hidden: Vec<(usize, usize)>,
    wrapping_column: usize,
    cache: RefCell<Option<Rc<LineMapping>>>,
}

impl CoordinatesConverter {
    pub fn new(wrapping_column: usize) -> Self {
        Self {
            hidden: Vec::new(),
            wrapping_column,
            cache: RefCell::new(None),
        }
    }

    pub fn wrapping_column(&self) -> usize {
        self.wrapping_column
    }

    pub fn set_wrapping_column(&mut self, wrapping_column: usize) {
        if self.wrapping_column != wrapping_column {
            self.wrapping_column = wrapping_column;
            self.invalidate();
        }
    }

    /// Hides every line touched by `ranges`. Replaces the previous set.
    pub fn set_hidden_areas(&mut self, ranges: &[Range]) {
        let mut lines: Vec<(usize, usize)> = ranges
            .iter()
            .map(|range| (range.start.line.max(1), range.end.line.max(1)))
            .collect();
        lines.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(lines.len());
        for (start, end) in lines {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        self.hidden = merged;
        self.invalidate();
    }

    pub fn hidden_areas(&self) -> Vec<RangeInclusive<usize>> {
        self.hidden.iter().map(|&(start, end)| start..=end).collect()
    }

    pub fn invalidate(&self) {
        self.cache.borrow_mut().take();
    }

    pub fn is_line_hidden(&self, line: usize) -> bool {
        let idx = self.hidden.partition_point(|&(start, _)| start <= line);
        idx > 0 && line <= self.hidden[idx - 1].1
    }

    fn mapping(&self, model: &TextModel) -> Rc<LineMapping> {
        let tab_size = model.options().tab_size;
        if let Some(mapping) = self.cache.borrow().as_ref() {
            if mapping.version == model.version_id() && mapping.tab_size == tab_size {
                return mapping.clone();
            }
        }

        let line_count = model.line_count();
        let mut segments = Vec::with_capacity(line_count);
        for line in 1..=line_count {
            if self.is_line_hidden(line) {
                segments.push(Vec::new());
            } else {
                segments.push(wrap_points(
                    &model.line_content(line),
                    self.wrapping_column,
                    tab_size,
                ));
            }
        }

        let mut first_view_line = vec![0; line_count];
        let mut next = 1usize;
        for (idx, starts) in segments.iter().enumerate() {
            first_view_line[idx] = next;
            next += starts.len();
        }

        let mapping = Rc::new(LineMapping {
            version: model.version_id(),
            tab_size,
            segments,
            first_view_line,
            view_line_count: next - 1,
        });
        *self.cache.borrow_mut() = Some(mapping.clone());
        mapping
    }

    pub fn view_line_count(&self, model: &TextModel) -> usize {
        self.mapping(model).view_line_count
    }

    /// Redirects a hidden model line to the end of the nearest visible line
    /// above, or the start of the nearest one below.
    fn visible_anchor(&self, mapping: &LineMapping, model: &TextModel, pos: Position) -> Option<Position> {
        let idx = pos.line - 1;
        if !mapping.segments[idx].is_empty() {
            return Some(pos);
        }
        if let Some(above) = (0..idx).rev().find(|&i| !mapping.segments[i].is_empty()) {
            return Some(Position::new(above + 1, model.line_max_column(above + 1)));
        }
        (idx + 1..mapping.segments.len())
            .find(|&i| !mapping.segments[i].is_empty())
            .map(|below| Position::new(below + 1, 1))
    }

    pub fn model_to_view(&self, model: &TextModel, pos: Position) -> Position {
        let mapping = self.mapping(model);
        let pos = model.validate_position(pos);
        let Some(pos) = self.visible_anchor(&mapping, model, pos) else {
            return Position::new(1, 1);
        };

        let starts = &mapping.segments[pos.line - 1];
        let segment = starts.partition_point(|&start| start <= pos.column).saturating_sub(1);
        Position::new(
            mapping.first_view_line[pos.line - 1] + segment,
            pos.column - starts[segment] + 1,
        )
    }

    pub fn view_to_model(&self, model: &TextModel, pos: Position) -> Position {
        let mapping = self.mapping(model);
        if mapping.view_line_count == 0 {
            return Position::new(1, 1);
        }
        let view_line = pos.line.clamp(1, mapping.view_line_count);
        let idx = mapping
            .first_view_line
            .partition_point(|&first| first <= view_line)
            .saturating_sub(1);
        let starts = &mapping.segments[idx];
        let Some(last_segment) = starts.len().checked_sub(1) else {
            return Position::new(idx + 1, 1);
        };
        let segment = (view_line - mapping.first_view_line[idx]).min(last_segment);

        let line = idx + 1;
        let max_column = match starts.get(segment + 1) {
            Some(next_start) => next_start - 1,
            None => model.line_max_column(line),
        };
        let column = starts[segment]
            .saturating_add(pos.column.max(1) - 1)
            .min(max_column);
        Position::new(line, column)
    }

    pub fn model_line_of_view_line(&self, model: &TextModel, view_line: usize) -> usize {
        self.view_to_model(model, Position::new(view_line, 1)).line
    }

    pub fn view_line_content(&self, model: &TextModel, view_line: usize) -> String {
        let start = self.view_to_model(model, Position::new(view_line, 1));
        let mapping = self.mapping(model);
        let starts = &mapping.segments[start.line - 1];
        let segment = starts.partition_point(|&s| s <= start.column).saturating_sub(1);
        // Every line hidden: there is no view line to read.
        let Some(&segment_start) = starts.get(segment) else {
            return String::new();
        };
        let content = model.line_content(start.line);
        let from = segment_start - 1;
        let to = starts
            .get(segment + 1)
            .map_or(content.chars().count(), |next| next - 1);
        content.chars().skip(from).take(to - from).collect()
    }

    /// Widest view line, in visible columns.
    pub fn max_view_line_width(&self, model: &TextModel) -> usize {
        let tab_size = model.options().tab_size;
        (1..=self.view_line_count(model))
            .map(|view_line| {
                let content = self.view_line_content(model, view_line);
                visible_column(&content, content.chars().count() + 1, tab_size)
            })
            .max()
            .unwrap_or(0)
    }

    /// Model line ranges that are currently visible.
    pub fn visible_line_ranges(&self, model: &TextModel) -> Vec<RangeInclusive<usize>> {
        let line_count = model.line_count();
        let mut out = Vec::new();
        let mut line = 1usize;
        for &(start, end) in &self.hidden {
            if start > line && line <= line_count {
                out.push(line..=(start - 1).min(line_count));
            }
            line = end + 1;
        }
        if line <= line_count {
            out.push(line..=line_count);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/converter.rs"]
mod tests;
