//! Editor event bus.
//!
//! One `EditorEvent` sum type instead of a field per emitter; listeners either
//! take every event or filter on an `EditorEventKind`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::models::{ContentChangedEvent, ModelId, Position, Range, Selection, TextModelOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CursorChangeReason {
    NotSet,
    ContentFlush,
    RecoverFromMarkers,
    Explicit,
    Paste,
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPositionChangedEvent {
    pub position: Position,
    pub secondary_positions: Vec<Position>,
    pub reason: CursorChangeReason,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorSelectionChangedEvent {
    pub selection: Selection,
    pub secondary_selections: Vec<Selection>,
    pub reason: CursorChangeReason,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollEvent {
    pub scroll_top: u32,
    pub scroll_left: u32,
    pub scroll_width: u32,
    pub scroll_height: u32,
    pub scroll_top_changed: bool,
    pub scroll_left_changed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ModelChanged {
        old_model: Option<ModelId>,
        new_model: Option<ModelId>,
    },
    ModelContentChanged(ContentChangedEvent),
    ModelDecorationsChanged,
    ModelOptionsChanged(TextModelOptions),
    ModelLanguageChanged {
        old_language: String,
        new_language: String,
    },
    CursorPositionChanged(CursorPositionChangedEvent),
    CursorSelectionChanged(CursorSelectionChangedEvent),
    DidAttemptReadOnlyEdit,
    ReachedMaxCursorCount {
        limit: usize,
    },
    WillType(String),
    DidType(String),
    DidPaste(Range),
    CompositionStart,
    CompositionEnd,
    ScrollChanged(ScrollEvent),
    LayoutChanged {
        width: u32,
        height: u32,
    },
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorEventKind {
    ModelChanged,
    ModelContentChanged,
    ModelDecorationsChanged,
    ModelOptionsChanged,
    ModelLanguageChanged,
    CursorPositionChanged,
    CursorSelectionChanged,
    DidAttemptReadOnlyEdit,
    ReachedMaxCursorCount,
    WillType,
    DidType,
    DidPaste,
    CompositionStart,
    CompositionEnd,
    ScrollChanged,
    LayoutChanged,
    Disposed,
}

impl EditorEvent {
    pub fn kind(&self) -> EditorEventKind {
        match self {
            EditorEvent::ModelChanged { .. } => EditorEventKind::ModelChanged,
            EditorEvent::ModelContentChanged(_) => EditorEventKind::ModelContentChanged,
            EditorEvent::ModelDecorationsChanged => EditorEventKind::ModelDecorationsChanged,
            EditorEvent::ModelOptionsChanged(_) => EditorEventKind::ModelOptionsChanged,
            EditorEvent::ModelLanguageChanged { .. } => EditorEventKind::ModelLanguageChanged,
            EditorEvent::CursorPositionChanged(_) => EditorEventKind::CursorPositionChanged,
            EditorEvent::CursorSelectionChanged(_) => EditorEventKind::CursorSelectionChanged,
            EditorEvent::DidAttemptReadOnlyEdit => EditorEventKind::DidAttemptReadOnlyEdit,
            EditorEvent::ReachedMaxCursorCount { .. } => EditorEventKind::ReachedMaxCursorCount,
            EditorEvent::WillType(_) => EditorEventKind::WillType,
            EditorEvent::DidType(_) => EditorEventKind::DidType,
            EditorEvent::DidPaste(_) => EditorEventKind::DidPaste,
            EditorEvent::CompositionStart => EditorEventKind::CompositionStart,
            EditorEvent::CompositionEnd => EditorEventKind::CompositionEnd,
            EditorEvent::ScrollChanged(_) => EditorEventKind::ScrollChanged,
            EditorEvent::LayoutChanged { .. } => EditorEventKind::LayoutChanged,
            EditorEvent::Disposed => EditorEventKind::Disposed,
        }
    }
}

type Listener<E> = Rc<dyn Fn(&E)>;

struct ListenerList<E> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<E>)>>,
}

/// Synchronous, single-threaded event emitter.
///
/// `fire` snapshots the listener list first: listeners added while an event is
/// being dispatched only see later events, and listeners may subscribe or
/// dispose re-entrantly.
pub struct Emitter<E> {
    list: Rc<ListenerList<E>>,
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            list: Rc::new(ListenerList {
                next_id: Cell::new(1),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = self.list.next_id.get();
        self.list.next_id.set(id.saturating_add(1));
        self.list
            .entries
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak: Weak<ListenerList<E>> = Rc::downgrade(&self.list);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(list) = weak.upgrade() {
                    list.entries.borrow_mut().retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    pub fn fire(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .list
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.list.entries.borrow().len()
    }

    pub fn clear(&self) {
        self.list.entries.borrow_mut().clear();
    }
}

impl Emitter<EditorEvent> {
    pub fn on(&self, kind: EditorEventKind, listener: impl Fn(&EditorEvent) + 'static) -> Subscription {
        self.subscribe(move |event| {
            if event.kind() == kind {
                listener(event);
            }
        })
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by `subscribe`; the listener stays registered until
/// `dispose` is called.
#[must_use = "dropping a Subscription keeps the listener registered forever"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn dispose(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/event.rs"]
mod tests;
