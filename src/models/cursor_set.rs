//! Multi-cursor helpers: keep a selection set sorted and non-overlapping.

use super::{Position, Selection};

fn overlaps(a: &Selection, b: &Selection) -> bool {
    match (a.is_empty(), b.is_empty()) {
        (false, false) => {
            let (a, b) = (a.range(), b.range());
            // half-open intersection
            a.start < b.end && b.start < a.end
        }
        (false, true) => a.contains(b.active()),
        (true, false) => b.contains(a.active()),
        (true, true) => a.active() == b.active(),
    }
}

fn merge_pair(prev: &Selection, cur: &Selection) -> Selection {
    let start = prev.start().min(cur.start());
    let end = prev.end().max(cur.end());
    if start == end {
        return Selection::caret(start);
    }
    // The earlier selection decides the orientation of the union.
    let orientation = if prev.is_empty() { cur } else { prev };
    if orientation.active() >= orientation.anchor() {
        Selection::new(start, end)
    } else {
        Selection::new(end, start)
    }
}

/// Sorts by start position and merges every overlapping pair.
///
/// Carets strictly inside a non-empty selection are absorbed by it; a caret
/// sitting on a selection's end stays separate (half-open ranges).
pub fn normalize(mut selections: Vec<Selection>) -> Vec<Selection> {
    if selections.len() <= 1 {
        return selections;
    }

    selections.sort_by(|a, b| {
        a.start()
            .cmp(&b.start())
            .then_with(|| a.end().cmp(&b.end()))
    });

    let mut out: Vec<Selection> = Vec::with_capacity(selections.len());
    for cur in selections {
        if let Some(prev) = out.last_mut() {
            if overlaps(prev, &cur) {
                *prev = merge_pair(prev, &cur);
                continue;
            }
        }
        out.push(cur);
    }
    out
}

/// True when `selections` is already in normalized form.
pub fn is_normalized(selections: &[Selection]) -> bool {
    selections.windows(2).all(|pair| {
        let (a, b) = (&pair[0], &pair[1]);
        a.start() <= b.start() && !overlaps(a, b)
    })
}

pub fn positions(selections: &[Selection]) -> Vec<Position> {
    selections.iter().map(Selection::position).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/models/cursor_set.rs"]
mod tests;
