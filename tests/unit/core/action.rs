use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn recording_sink() -> (ErrorSink, Arc<Mutex<Vec<EditorError>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = seen.clone();
    let sink = ErrorSink::new(move |err| sink_seen.lock().unwrap().push(err.clone()));
    (sink, seen)
}

#[test]
fn test_action_runs_without_ambient_runtime() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let action = EditorAction::new("demo.count", "Count", move |_: &Value| -> ActionFuture {
        let counter = counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    });
    let (sink, seen) = recording_sink();

    action.run(&Value::Null, None, &sink);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(action.id(), "demo.count");
    assert_eq!(action.label(), "Count");
}

#[test]
fn test_failed_action_reports_to_sink() {
    let action = EditorAction::new("demo.fail", "Fail", |payload: &Value| -> ActionFuture {
        let reason = payload.as_str().unwrap_or("?").to_string();
        Box::pin(async move { Err(EditorError::invalid(reason)) })
    });
    let (sink, seen) = recording_sink();

    action.run(&Value::from("boom"), None, &sink);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    match &seen[0] {
        EditorError::UnexpectedAsyncFailure(msg) => assert!(msg.contains("demo.fail")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_action_spawns_on_given_runtime() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    let action = EditorAction::new("demo.send", "Send", move |_: &Value| -> ActionFuture {
        let tx = tx.clone();
        Box::pin(async move {
            tx.send(7).ok();
            Ok(())
        })
    });
    let (sink, _) = recording_sink();

    action.run(&Value::Null, Some(runtime.handle()), &sink);

    let got = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
    assert_eq!(got, 7);
}
