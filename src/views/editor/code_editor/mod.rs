//! The code editor widget.
//!
//! Binds at most one shared `TextModel` at a time. Everything that only
//! exists while a model is attached (cursor state, converter, scroll
//! geometry, the optional real view) lives in [`Attachment`]; the rest
//! (widgets, actions, contributions, decoration key state) survives model
//! switches.
//!
//! Model notifications arrive through a channel and are applied by
//! [`CodeEditor::sync_with_model`], which every mutating operation calls
//! first; `&self` queries see the state as of the last sync. Editor events
//! are queued while the model is borrowed and fired afterwards.

mod attach;
mod decorations;
mod edit;
mod persistence;
mod reveal;
mod widgets;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde_json::Value;

use super::decorations::EditorDecorations;
use super::widgets::WidgetRegistry;
use crate::core::action::EditorAction;
use crate::core::error::{global_error_sink, EditorError, ErrorSink};
use crate::core::event::{
    CursorChangeReason, CursorPositionChangedEvent, CursorSelectionChangedEvent, EditorEvent,
    EditorEventKind, Emitter, Subscription,
};
use crate::kernel::config::EditorConfig;
use crate::kernel::converter::CoordinatesConverter;
use crate::kernel::cursor::{CursorState, CursorUpdate};
use crate::kernel::decoration_types::SharedDecorationTypes;
use crate::kernel::viewport::ViewLayout;
use crate::models::{ModelId, ModelSubscription, OwnerId, TextModel};
use crate::views::view::{ContentWidgetData, OverlayWidgetData, View, ViewFactory};

pub use persistence::ViewState;

/// Per-editor extension with optional persisted state.
pub trait EditorContribution {
    fn id(&self) -> &str;
    fn save_view_state(&self) -> Option<Value> {
        None
    }
    fn restore_view_state(&mut self, _state: &Value) {}
    fn dispose(&mut self) {}
}

fn next_editor_id() -> OwnerId {
    static NEXT: AtomicU32 = AtomicU32::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

struct Attachment {
    model: Rc<RefCell<TextModel>>,
    model_id: ModelId,
    subscription: ModelSubscription,
    cursor: CursorState,
    converter: CoordinatesConverter,
    layout: ViewLayout,
    view: Option<Box<dyn View>>,
}

pub struct CodeEditor {
    id: OwnerId,
    config: EditorConfig,
    /// Last size passed to `layout`, applied to every new attachment.
    dimensions: (u32, u32),
    attachment: Option<Attachment>,
    emitter: Emitter<EditorEvent>,
    pending_events: Vec<EditorEvent>,
    error_sink: ErrorSink,
    runtime: Option<tokio::runtime::Handle>,
    view_factory: Option<Rc<dyn ViewFactory>>,
    decoration_types: SharedDecorationTypes,
    decorations: EditorDecorations,
    content_widgets: WidgetRegistry<ContentWidgetData>,
    overlay_widgets: WidgetRegistry<OverlayWidgetData>,
    actions: FxHashMap<CompactString, EditorAction>,
    contributions: Vec<Box<dyn EditorContribution>>,
    disposed: bool,
}

impl CodeEditor {
    pub fn new(
        config: EditorConfig,
        decoration_types: SharedDecorationTypes,
        view_factory: Option<Rc<dyn ViewFactory>>,
    ) -> Self {
        let id = next_editor_id();
        tracing::debug!(editor = id, "create editor");
        Self {
            id,
            dimensions: (config.viewport_width, config.viewport_height),
            config,
            attachment: None,
            emitter: Emitter::new(),
            pending_events: Vec::new(),
            error_sink: global_error_sink(),
            runtime: None,
            view_factory,
            decoration_types,
            decorations: EditorDecorations::new(),
            content_widgets: WidgetRegistry::new(),
            overlay_widgets: WidgetRegistry::new(),
            actions: FxHashMap::default(),
            contributions: Vec::new(),
            disposed: false,
        }
    }

    /// Owner id stamped on every decoration this editor creates.
    pub fn id(&self) -> OwnerId {
        self.id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_error_sink(&mut self, sink: ErrorSink) {
        self.error_sink = sink;
    }

    pub fn set_runtime(&mut self, runtime: tokio::runtime::Handle) {
        self.runtime = Some(runtime);
    }

    // ==================== events ====================

    pub fn subscribe(&self, listener: impl Fn(&EditorEvent) + 'static) -> Subscription {
        self.emitter.subscribe(listener)
    }

    pub fn on(&self, kind: EditorEventKind, listener: impl Fn(&EditorEvent) + 'static) -> Subscription {
        self.emitter.on(kind, listener)
    }

    fn queue(&mut self, event: EditorEvent) {
        self.pending_events.push(event);
    }

    fn flush_events(&mut self) {
        let events = std::mem::take(&mut self.pending_events);
        for event in &events {
            self.emitter.fire(event);
        }
    }

    /// Queues the cursor events for `update`. `force` emits even when the
    /// selections did not change.
    fn queue_cursor_events(
        &mut self,
        update: CursorUpdate,
        reason: CursorChangeReason,
        source: &str,
        force: bool,
    ) {
        if update.reached_limit {
            let limit = self.config.max_cursor_count;
            let err = EditorError::CapacityExceeded { limit };
            tracing::warn!(editor = self.id, error = %err, "extra cursors dropped");
            self.queue(EditorEvent::ReachedMaxCursorCount { limit });
        }
        if !(update.changed || force) {
            return;
        }
        let Some(att) = self.attachment.as_ref() else {
            return;
        };
        let primary = att.cursor.primary();
        let secondary = att.cursor.secondary();
        let position = CursorPositionChangedEvent {
            position: primary.position(),
            secondary_positions: secondary.iter().map(|s| s.position()).collect(),
            reason,
            source: source.to_string(),
        };
        let selection = CursorSelectionChangedEvent {
            selection: primary,
            secondary_selections: secondary,
            reason,
            source: source.to_string(),
        };
        self.queue(EditorEvent::CursorPositionChanged(position));
        self.queue(EditorEvent::CursorSelectionChanged(selection));
    }

    // ==================== model / view state ====================

    pub fn has_model(&self) -> bool {
        self.attachment.is_some()
    }

    pub fn model(&self) -> Option<Rc<RefCell<TextModel>>> {
        self.attachment.as_ref().map(|att| att.model.clone())
    }

    pub fn model_id(&self) -> Option<ModelId> {
        self.attachment.as_ref().map(|att| att.model_id)
    }

    pub fn has_real_view(&self) -> bool {
        self.attachment.as_ref().is_some_and(|att| att.view.is_some())
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
            || self
                .attachment
                .as_ref()
                .is_some_and(|att| att.model.borrow().is_read_only())
    }

    pub fn update_config(&mut self, config: EditorConfig) {
        if let Some(att) = self.attachment.as_mut() {
            att.converter.set_wrapping_column(config.wrapping_column);
        }
        self.config = config;
    }

    pub fn focus(&mut self) {
        if let Some(view) = self.attachment.as_mut().and_then(|att| att.view.as_mut()) {
            view.focus();
        }
    }

    pub fn is_focused(&self) -> bool {
        self.attachment
            .as_ref()
            .and_then(|att| att.view.as_ref())
            .is_some_and(|view| view.is_focused())
    }

    pub fn render(&mut self, force: bool) {
        self.sync_with_model();
        if let Some(view) = self.attachment.as_mut().and_then(|att| att.view.as_mut()) {
            view.render(force);
        }
    }

    /// Resizes the viewport. The scroll position is re-clamped.
    pub fn layout(&mut self, width: u32, height: u32) {
        self.sync_with_model();
        self.dimensions = (width, height);
        let Some(att) = self.attachment.as_mut() else {
            return;
        };
        if !att.layout.set_dimensions(width, height) {
            return;
        }
        self.queue(EditorEvent::LayoutChanged { width, height });
        self.clamp_scroll();
        self.flush_events();
    }

    // ==================== actions / contributions ====================

    pub fn add_action(&mut self, action: EditorAction) {
        let id = CompactString::from(action.id());
        if self.actions.insert(id, action).is_some() {
            tracing::warn!(editor = self.id, "overwriting an action with the same id");
        }
    }

    pub fn get_action(&self, id: &str) -> Option<&EditorAction> {
        self.actions.get(id)
    }

    pub fn supported_actions(&self) -> Vec<&EditorAction> {
        let mut actions: Vec<&EditorAction> = self.actions.values().collect();
        actions.sort_by(|a, b| a.id().cmp(b.id()));
        actions
    }

    /// Returns `false` when no action has that id.
    pub fn run_action(&self, id: &str, payload: &Value) -> bool {
        match self.actions.get(id) {
            Some(action) => {
                action.run(payload, self.runtime.as_ref(), &self.error_sink);
                true
            }
            None => false,
        }
    }

    pub fn add_contribution(&mut self, contribution: Box<dyn EditorContribution>) {
        self.contributions
            .retain(|existing| existing.id() != contribution.id());
        self.contributions.push(contribution);
    }

    pub fn contribution(&self, id: &str) -> Option<&dyn EditorContribution> {
        self.contributions
            .iter()
            .find(|contribution| contribution.id() == id)
            .map(|contribution| contribution.as_ref())
    }

    // ==================== lifecycle ====================

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Detaches the model and drops everything; later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.set_model(None);
        for contribution in &mut self.contributions {
            contribution.dispose();
        }
        self.contributions.clear();
        self.actions.clear();
        self.disposed = true;
        self.queue(EditorEvent::Disposed);
        self.flush_events();
        self.emitter.clear();
        tracing::debug!(editor = self.id, "dispose editor");
    }
}

impl Drop for CodeEditor {
    fn drop(&mut self) {
        if self.attachment.is_some() {
            self.detach_model();
        }
    }
}

impl std::fmt::Debug for CodeEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeEditor")
            .field("id", &self.id)
            .field("model", &self.model_id())
            .field("has_real_view", &self.has_real_view())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/views/editor/code_editor.rs"]
mod tests;
