use super::*;
use std::cell::RefCell;

#[test]
fn test_fire_reaches_listeners_in_registration_order() {
    let emitter: Emitter<u32> = Emitter::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let first = log.clone();
    let _a = emitter.subscribe(move |v| first.borrow_mut().push(("a", *v)));
    let second = log.clone();
    let _b = emitter.subscribe(move |v| second.borrow_mut().push(("b", *v)));

    emitter.fire(&7);
    assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
}

#[test]
fn test_listener_added_during_dispatch_misses_current_event() {
    let emitter: Rc<Emitter<u32>> = Rc::new(Emitter::new());
    let log = Rc::new(RefCell::new(Vec::new()));
    let late_subs = Rc::new(RefCell::new(Vec::new()));

    let emitter_in = emitter.clone();
    let log_in = log.clone();
    let subs_in = late_subs.clone();
    let _outer = emitter.subscribe(move |v| {
        if *v == 1 {
            let log_late = log_in.clone();
            let sub = emitter_in.subscribe(move |v| log_late.borrow_mut().push(*v));
            subs_in.borrow_mut().push(sub);
        }
    });

    emitter.fire(&1);
    assert!(log.borrow().is_empty());

    emitter.fire(&2);
    assert_eq!(*log.borrow(), vec![2]);
}

#[test]
fn test_dispose_removes_listener() {
    let emitter: Emitter<u32> = Emitter::new();
    let hits = Rc::new(Cell::new(0));
    let hits_in = hits.clone();
    let sub = emitter.subscribe(move |_| hits_in.set(hits_in.get() + 1));

    emitter.fire(&1);
    sub.dispose();
    emitter.fire(&2);

    assert_eq!(hits.get(), 1);
    assert_eq!(emitter.listener_count(), 0);
}

#[test]
fn test_on_filters_by_kind() {
    let emitter: Emitter<EditorEvent> = Emitter::new();
    let hits = Rc::new(Cell::new(0));
    let hits_in = hits.clone();
    let _sub = emitter.on(EditorEventKind::CompositionEnd, move |_| {
        hits_in.set(hits_in.get() + 1)
    });

    emitter.fire(&EditorEvent::CompositionStart);
    emitter.fire(&EditorEvent::CompositionEnd);
    emitter.fire(&EditorEvent::DidAttemptReadOnlyEdit);

    assert_eq!(hits.get(), 1);
}
