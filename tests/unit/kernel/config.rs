use super::*;
use std::io::Write;

#[test]
fn test_default_has_documented_cursor_ceiling() {
    let config = EditorConfig::default();
    assert_eq!(config.max_cursor_count, DEFAULT_MAX_CURSOR_COUNT);
    assert_eq!(config.wrapping_column, 0);
}

#[test]
fn test_partial_json_fills_defaults() {
    let config = EditorConfig::from_json(r#"{ "read_only": true, "wrapping_column": 40 }"#)
        .expect("parse");
    assert!(config.read_only);
    assert_eq!(config.wrapping_column, 40);
    assert_eq!(config.line_height, EditorConfig::default().line_height);
}

#[test]
fn test_zero_cursor_ceiling_is_rejected() {
    let err = EditorConfig::from_json(r#"{ "max_cursor_count": 0 }"#).unwrap_err();
    assert!(matches!(err, EditorError::Config(_)));
}

#[test]
fn test_load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, r#"{{ "max_cursor_count": 3 }}"#).expect("write");
    let config = EditorConfig::load(file.path()).expect("load");
    assert_eq!(config.max_cursor_count, 3);
}

#[test]
fn test_load_missing_file_is_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = EditorConfig::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, EditorError::Config(_)));
}
