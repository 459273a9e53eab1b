use super::*;

fn layout() -> ViewLayout {
    ViewLayout::new(&EditorConfig::default())
}

#[test]
fn test_scroll_height_includes_room_beyond_last_line() {
    let layout = layout();
    assert_eq!(layout.content_height(100), 1800);
    assert_eq!(layout.scroll_height(100), 1800 + 600 - 18);
    assert_eq!(layout.max_scroll_top(100), 1782);
    // Short documents still fill the viewport.
    assert_eq!(layout.scroll_height(1), 600);
}

#[test]
fn test_scroll_height_without_beyond_last_line() {
    let config = EditorConfig {
        scroll_beyond_last_line: false,
        ..EditorConfig::default()
    };
    let layout = ViewLayout::new(&config);
    assert_eq!(layout.max_scroll_top(100), 1200);
}

#[test]
fn test_set_scroll_position_clamps_and_reports_changes() {
    let mut layout = layout();
    let event = layout.set_scroll_position(Some(10_000), None, 100, 10);
    assert_eq!(event.scroll_top, 1782);
    assert!(event.scroll_top_changed);
    assert!(!event.scroll_left_changed);
    assert_eq!(layout.scroll_top(), 1782);

    let again = layout.set_scroll_position(Some(1782), None, 100, 10);
    assert!(!again.scroll_top_changed);
}

#[test]
fn test_scroll_left_is_bounded_by_widest_line() {
    let mut layout = layout();
    // 200 columns * 8px = 1608px wide content.
    let event = layout.set_scroll_position(None, Some(5000), 1, 200);
    assert_eq!(event.scroll_width, 1608);
    assert_eq!(event.scroll_left, 808);
}

#[test]
fn test_reveal_simple_scrolls_minimally() {
    let layout = layout();
    assert_eq!(layout.reveal_top(5, 5, VerticalRevealType::Simple), 0);
    assert_eq!(layout.reveal_top(50, 50, VerticalRevealType::Simple), 900 - 600);
}

#[test]
fn test_reveal_simple_above_viewport_aligns_top() {
    let mut layout = layout();
    layout.set_scroll_position(Some(900), None, 100, 0);
    assert_eq!(layout.reveal_top(10, 10, VerticalRevealType::Simple), 162);
}

#[test]
fn test_reveal_center_and_top() {
    let layout = layout();
    assert_eq!(layout.reveal_top(50, 50, VerticalRevealType::Center), (882 + 900 - 600) / 2);
    assert_eq!(layout.reveal_top(50, 50, VerticalRevealType::Top), 882);
    assert_eq!(
        layout.reveal_top(5, 5, VerticalRevealType::CenterIfOutsideViewport),
        0
    );
    assert_eq!(
        layout.reveal_top(50, 50, VerticalRevealType::CenterIfOutsideViewport),
        591
    );
}

#[test]
fn test_reveal_left_keeps_visible_columns() {
    let layout = layout();
    assert_eq!(layout.reveal_left(10, 10), 0);
    assert_eq!(layout.reveal_left(150, 150), 151 * 8 - 800);
}

#[test]
fn test_visible_view_lines() {
    let mut layout = layout();
    assert_eq!(layout.visible_view_lines(100), 1..=34);
    assert_eq!(layout.visible_view_lines(10), 1..=10);
    layout.set_scroll_position(Some(180), None, 100, 0);
    assert_eq!(layout.visible_view_lines(100), 11..=44);
}

#[test]
fn test_hit_test_maps_to_nearest_column() {
    let layout = layout();
    assert_eq!(layout.hit_test(20, 40), Some((3, 3)));
    assert_eq!(layout.hit_test(800, 0), None);
}

#[test]
fn test_visible_position_is_relative_to_scroll() {
    let mut layout = layout();
    layout.set_scroll_position(Some(36), None, 100, 0);
    let visible = layout.visible_position(2, 4);
    assert_eq!(visible.top, -18);
    assert_eq!(visible.left, 32);
    assert_eq!(visible.height, 18);
}
