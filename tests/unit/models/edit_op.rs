use super::*;

fn pos(line: usize, column: usize) -> Position {
    Position::new(line, column)
}

fn applied(range: Range, text: &str) -> AppliedEdit {
    AppliedEdit {
        range,
        new_range: range,
        text: text.to_string(),
        old_text: String::new(),
    }
}

#[test]
fn test_end_of_insert_single_and_multi_line() {
    assert_eq!(end_of_insert(pos(2, 3), "ab"), pos(2, 5));
    assert_eq!(end_of_insert(pos(2, 3), "ab\ncde"), pos(3, 4));
    assert_eq!(end_of_insert(pos(1, 1), "x\r\n"), pos(2, 1));
    assert_eq!(end_of_insert(pos(4, 7), ""), pos(4, 7));
}

#[test]
fn test_position_before_edit_is_untouched() {
    let range = Range::from_coords(1, 5, 1, 7);
    assert_eq!(
        adjust_position_after_edit(pos(1, 2), range, "xyz", Affinity::After),
        pos(1, 2)
    );
}

#[test]
fn test_insert_at_position_respects_affinity() {
    let at = Range::empty(pos(1, 3));
    assert_eq!(adjust_position_after_edit(pos(1, 3), at, "XY", Affinity::Before), pos(1, 3));
    assert_eq!(adjust_position_after_edit(pos(1, 3), at, "XY", Affinity::After), pos(1, 5));
}

#[test]
fn test_position_inside_replaced_range_collapses() {
    let range = Range::from_coords(1, 2, 1, 8);
    assert_eq!(adjust_position_after_edit(pos(1, 5), range, "Q", Affinity::Before), pos(1, 2));
    assert_eq!(adjust_position_after_edit(pos(1, 5), range, "Q", Affinity::After), pos(1, 3));
}

#[test]
fn test_same_line_tail_shifts_by_column_delta() {
    let range = Range::from_coords(1, 2, 1, 4);
    assert_eq!(
        adjust_position_after_edit(pos(1, 6), range, "", Affinity::After),
        pos(1, 4)
    );
}

#[test]
fn test_newline_insert_moves_tail_to_next_line() {
    let at = Range::empty(pos(1, 3));
    assert_eq!(adjust_position_after_edit(pos(1, 5), at, "\n", Affinity::After), pos(2, 3));
    assert_eq!(adjust_position_after_edit(pos(3, 2), at, "\n", Affinity::After), pos(4, 2));
}

#[test]
fn test_batch_walks_back_to_front() {
    // "abcdef": insert "XY" before 'b', delete "de"
    let edits = [
        applied(Range::empty(pos(1, 2)), "XY"),
        applied(Range::from_coords(1, 4, 1, 6), ""),
    ];
    assert_eq!(adjust_position_after_edits(pos(1, 1), &edits, Affinity::After), pos(1, 1));
    assert_eq!(adjust_position_after_edits(pos(1, 3), &edits, Affinity::After), pos(1, 5));
    assert_eq!(adjust_position_after_edits(pos(1, 7), &edits, Affinity::After), pos(1, 7));
}

#[test]
fn test_sort_and_check_overlap() {
    let mut ok = vec![
        SingleEditOperation::delete(Range::from_coords(1, 4, 1, 6)),
        SingleEditOperation::insert(pos(1, 1), "a"),
    ];
    assert!(sort_and_check_overlap(&mut ok, |e| e.range));
    assert_eq!(ok[0].range.start, pos(1, 1));

    let mut bad = vec![
        SingleEditOperation::delete(Range::from_coords(1, 1, 1, 5)),
        SingleEditOperation::delete(Range::from_coords(1, 3, 1, 7)),
    ];
    assert!(!sort_and_check_overlap(&mut bad, |e| e.range));
}
