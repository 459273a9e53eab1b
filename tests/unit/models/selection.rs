use super::*;

#[test]
fn test_selection_range() {
    let sel = Selection::caret(Position::new(1, 5));
    assert_eq!(sel.range(), Range::from_coords(1, 5, 1, 5));
    assert!(sel.is_empty());

    let sel = Selection::from_coords(2, 3, 5, 7);
    assert_eq!(sel.range(), Range::from_coords(2, 3, 5, 7));
    assert_eq!(sel.direction(), SelectionDirection::Ltr);

    let sel = Selection::from_coords(5, 7, 2, 3);
    assert_eq!(sel.range(), Range::from_coords(2, 3, 5, 7));
    assert_eq!(sel.direction(), SelectionDirection::Rtl);
    assert_eq!(sel.position(), Position::new(2, 3));
}

#[test]
fn test_from_range_keeps_direction() {
    let range = Range::from_coords(1, 1, 1, 4);
    let rtl = Selection::from_range(range, SelectionDirection::Rtl);
    assert_eq!(rtl.anchor(), Position::new(1, 4));
    assert_eq!(rtl.active(), Position::new(1, 1));
    assert_eq!(rtl.range(), range);
}

#[test]
fn test_contains_is_half_open() {
    let sel = Selection::from_coords(1, 2, 1, 4);
    assert!(sel.contains(Position::new(1, 2)));
    assert!(sel.contains(Position::new(1, 3)));
    assert!(!sel.contains(Position::new(1, 4)));
}

#[test]
fn test_well_formed() {
    assert!(Selection::from_coords(1, 1, 3, 9).is_well_formed());
    assert!(!Selection::from_coords(0, 1, 1, 1).is_well_formed());
    assert!(!Selection::from_coords(1, 1, 1, 0).is_well_formed());
}
