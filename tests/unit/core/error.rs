use super::*;
use std::sync::Mutex;

#[test]
fn test_error_display() {
    assert_eq!(
        EditorError::invalid("empty selections").to_string(),
        "invalid argument: empty selections"
    );
    assert_eq!(EditorError::ReadOnlyViolation.to_string(), "model is read-only");
    assert_eq!(
        EditorError::CapacityExceeded { limit: 3 }.to_string(),
        "capacity exceeded: at most 3 cursors"
    );
}

#[test]
fn test_sink_forwards_to_handler() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_sink = seen.clone();
    let sink = ErrorSink::new(move |err| {
        seen_in_sink.lock().unwrap().push(err.clone());
    });

    sink.clone()
        .report(&EditorError::UnexpectedAsyncFailure("boom".into()));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(matches!(&seen[0], EditorError::UnexpectedAsyncFailure(msg) if msg == "boom"));
}

#[test]
fn test_json_error_maps_to_config() {
    let err: EditorError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, EditorError::Config(_)));
}
