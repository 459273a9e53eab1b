use super::*;
use serde_json::json;

#[test]
fn test_from_name_type() {
    let cmd = EditorCommand::from_name("type", &json!({ "text": "x" })).unwrap();
    assert!(matches!(cmd, EditorCommand::Type { ref text } if text == "x"));
    assert_eq!(cmd.name(), "type");
}

#[test]
fn test_from_name_type_without_text_is_rejected() {
    assert!(EditorCommand::from_name("type", &json!({})).is_none());
}

#[test]
fn test_from_name_paste_payload() {
    let cmd = EditorCommand::from_name(
        "paste",
        &json!({ "text": "a\nb", "pasteOnNewLine": true, "multicursorText": ["a", "b"] }),
    )
    .unwrap();
    match cmd {
        EditorCommand::Paste {
            text,
            paste_on_new_line,
            multicursor_text,
        } => {
            assert_eq!(text, "a\nb");
            assert!(paste_on_new_line);
            assert_eq!(multicursor_text, Some(vec!["a".to_string(), "b".to_string()]));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_cursor_moves_round_trip_names() {
    for name in ["cursorLeft", "cursorEndSelect", "cursorUp"] {
        let cmd = EditorCommand::from_name(name, &Value::Null).unwrap();
        assert!(cmd.is_cursor_command());
        assert_eq!(cmd.name(), name);
    }
}

#[test]
fn test_unknown_name_becomes_custom() {
    let cmd = EditorCommand::from_name("editor.action.frobnicate", &Value::Null).unwrap();
    assert!(matches!(cmd, EditorCommand::Custom(ref id) if id == "editor.action.frobnicate"));
    assert!(!cmd.is_edit_command());
}

#[test]
fn test_execute_command_not_reachable_by_name() {
    assert!(EditorCommand::from_name("executeCommand", &Value::Null).is_none());
}
