use super::*;

fn caret(line: usize, col: usize) -> Selection {
    Selection::caret(Position::new(line, col))
}

#[test]
fn test_normalize_sorts_by_document_order() {
    let out = normalize(vec![caret(3, 1), caret(1, 4), caret(2, 2)]);
    assert_eq!(out, vec![caret(1, 4), caret(2, 2), caret(3, 1)]);
    assert!(is_normalized(&out));
}

#[test]
fn test_normalize_merges_duplicate_carets() {
    let out = normalize(vec![caret(1, 2), caret(1, 2)]);
    assert_eq!(out, vec![caret(1, 2)]);
}

#[test]
fn test_normalize_absorbs_caret_inside_selection() {
    let sel = Selection::from_coords(1, 1, 1, 6);
    let out = normalize(vec![caret(1, 3), sel]);
    assert_eq!(out, vec![sel]);
}

#[test]
fn test_caret_at_selection_end_stays_separate() {
    let sel = Selection::from_coords(1, 1, 1, 6);
    let out = normalize(vec![sel, caret(1, 6)]);
    assert_eq!(out.len(), 2);
}

#[test]
fn test_overlapping_selections_union_keeps_orientation() {
    let a = Selection::from_coords(1, 8, 1, 2);
    let b = Selection::from_coords(1, 5, 1, 12);
    let out = normalize(vec![b, a]);
    assert_eq!(out, vec![Selection::from_coords(1, 12, 1, 2)]);
}

#[test]
fn test_is_normalized_detects_overlap() {
    let a = Selection::from_coords(1, 1, 1, 5);
    let b = Selection::from_coords(1, 3, 1, 9);
    assert!(!is_normalized(&[a, b]));
}
