use super::*;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use serde_json::json;

use crate::core::action::ActionFuture;
use crate::core::command::{CursorDirection, EditorCommand};
use crate::core::error::EditorError;
use crate::kernel::cursor::ResultingSelection;
use crate::kernel::decoration_types::{DecorationRenderOptions, DecorationTypeService};
use crate::models::{Position, Range, Selection, SingleEditOperation, TextModelOptions};
use crate::views::editor::decorations::DecorationOptions;
use crate::views::view::{ContentWidget, ContentWidgetPosition, MouseTargetType, OverviewRuler};

fn shared_model(text: &str) -> Rc<RefCell<TextModel>> {
    Rc::new(RefCell::new(TextModel::new(text)))
}

fn editor_with(config: EditorConfig, model: &Rc<RefCell<TextModel>>) -> CodeEditor {
    let mut editor = CodeEditor::new(config, DecorationTypeService::shared(), None);
    editor.set_model(Some(model.clone()));
    editor
}

fn attached(text: &str) -> (CodeEditor, Rc<RefCell<TextModel>>) {
    let model = shared_model(text);
    (editor_with(EditorConfig::default(), &model), model)
}

fn record(editor: &CodeEditor) -> (Rc<RefCell<Vec<EditorEvent>>>, Subscription) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let subscription = editor.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    (events, subscription)
}

fn kinds(events: &Rc<RefCell<Vec<EditorEvent>>>) -> Vec<EditorEventKind> {
    events.borrow().iter().map(EditorEvent::kind).collect()
}

fn numbered_lines(count: usize) -> String {
    (1..=count)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

struct NullView {
    focused: bool,
}

impl View for NullView {
    fn render(&mut self, _force: bool) {}
    fn focus(&mut self) {
        self.focused = true;
    }
    fn is_focused(&self) -> bool {
        self.focused
    }
    fn add_content_widget(&mut self, _data: &ContentWidgetData) {}
    fn layout_content_widget(&mut self, _data: &ContentWidgetData) {}
    fn remove_content_widget(&mut self, _id: &str) {}
    fn add_overlay_widget(&mut self, _data: &OverlayWidgetData) {}
    fn layout_overlay_widget(&mut self, _data: &OverlayWidgetData) {}
    fn remove_overlay_widget(&mut self, _id: &str) {}
}

struct NullViewFactory;

impl ViewFactory for NullViewFactory {
    fn create_view(&self, _model: ModelId) -> Option<Box<dyn View>> {
        Some(Box::new(NullView { focused: false }))
    }
}

#[test]
fn test_detached_editor_answers_with_defaults() {
    let mut editor = CodeEditor::new(EditorConfig::default(), DecorationTypeService::shared(), None);

    assert!(!editor.has_model());
    assert_eq!(editor.value(), "");
    assert_eq!(editor.selections(), None);
    assert_eq!(editor.scroll_top(), 0);
    assert!(editor.save_view_state().is_none());
    assert!(!editor.push_undo_stop());
    let edits = vec![SingleEditOperation::insert(Position::new(1, 1), "x")];
    assert_eq!(
        editor.execute_edits("test", edits, ResultingSelection::Unchanged),
        Ok(false)
    );
    assert!(editor.set_position(Position::new(1, 1)).is_ok());
}

#[test]
fn test_attach_emits_one_model_changed_and_reattach_is_noop() {
    let model = shared_model("abc");
    let mut editor = CodeEditor::new(EditorConfig::default(), DecorationTypeService::shared(), None);
    let (events, _sub) = record(&editor);

    editor.set_model(Some(model.clone()));
    editor.set_model(Some(model.clone()));

    let id = model.borrow().id();
    assert_eq!(
        *events.borrow(),
        vec![EditorEvent::ModelChanged {
            old_model: None,
            new_model: Some(id),
        }]
    );
    assert_eq!(model.borrow().attached_editors(), 1);
    assert_eq!(model.borrow().listener_count(), 1);
    assert_eq!(editor.position(), Some(Position::new(1, 1)));
}

#[test]
fn test_detach_drops_owned_decorations_and_subtypes() {
    let types = DecorationTypeService::shared();
    types
        .borrow_mut()
        .register_decoration_type("lint", DecorationRenderOptions::default(), None);
    let model = shared_model("one\ntwo");
    let mut editor = CodeEditor::new(EditorConfig::default(), types.clone(), None);
    editor.set_model(Some(model.clone()));

    let styled = DecorationOptions {
        render_options: Some(DecorationRenderOptions {
            color: Some("red".into()),
            ..DecorationRenderOptions::default()
        }),
        ..DecorationOptions::new(Range::from_coords(1, 1, 1, 3))
    };
    editor.set_decorations("lint", &[styled]).expect("set decorations");
    assert_eq!(types.borrow().subtype_count("lint"), 1);

    editor.set_model(None);

    assert_eq!(model.borrow().owner_decoration_count(editor.id()), 0);
    assert_eq!(types.borrow().subtype_count("lint"), 0);
    assert!(types.borrow().has_type("lint"));
    assert!(editor.decoration_ids("lint").is_empty());
    assert_eq!(model.borrow().attached_editors(), 0);
    assert_eq!(model.borrow().listener_count(), 0);
}

#[test]
fn test_typing_moves_caret_once() {
    let (mut editor, _model) = attached("abc");
    let (events, _sub) = record(&editor);

    editor.trigger_named("keyboard", "type", &json!({ "text": "x" }));

    assert_eq!(editor.value(), "xabc");
    assert_eq!(editor.position(), Some(Position::new(1, 2)));
    assert_eq!(
        kinds(&events),
        vec![
            EditorEventKind::WillType,
            EditorEventKind::ModelContentChanged,
            EditorEventKind::CursorPositionChanged,
            EditorEventKind::CursorSelectionChanged,
            EditorEventKind::DidType,
        ]
    );
}

#[test]
fn test_external_edit_reanchors_after_sync() {
    let model = shared_model("abc");
    let mut writer = editor_with(EditorConfig::default(), &model);
    let mut reader = editor_with(EditorConfig::default(), &model);
    reader.set_position(Position::new(1, 3)).expect("set position");
    let (events, _sub) = record(&reader);

    writer
        .execute_edits(
            "test",
            vec![SingleEditOperation::insert(Position::new(1, 1), "XY")],
            ResultingSelection::Unchanged,
        )
        .expect("edit");
    reader.sync_with_model();

    assert_eq!(reader.position(), Some(Position::new(1, 5)));
    let reason = events.borrow().iter().find_map(|event| match event {
        EditorEvent::CursorPositionChanged(change) => Some(change.reason),
        _ => None,
    });
    assert_eq!(reason, Some(CursorChangeReason::RecoverFromMarkers));
}

#[test]
fn test_queued_external_edits_are_tracked_before_clamping() {
    let model = shared_model("abcdef");
    let mut writer = editor_with(EditorConfig::default(), &model);
    let mut reader = editor_with(EditorConfig::default(), &model);
    reader.set_position(Position::new(1, 4)).expect("set position");
    let (events, _sub) = record(&reader);

    writer
        .execute_edits(
            "test",
            vec![SingleEditOperation::insert(Position::new(1, 1), "\n\n\n")],
            ResultingSelection::Unchanged,
        )
        .expect("insert");
    writer
        .execute_edits(
            "test",
            vec![SingleEditOperation::delete(Range::from_coords(1, 1, 4, 1))],
            ResultingSelection::Unchanged,
        )
        .expect("delete");
    reader.sync_with_model();

    assert_eq!(model.borrow().value(), "abcdef");
    assert_eq!(reader.position(), Some(Position::new(1, 4)));
    let content_changes = kinds(&events)
        .into_iter()
        .filter(|kind| *kind == EditorEventKind::ModelContentChanged)
        .count();
    assert_eq!(content_changes, 2);
}

#[test]
fn test_set_value_resets_cursor_with_flush_reason() {
    let (mut editor, _model) = attached("abc\ndef");
    editor.set_position(Position::new(2, 3)).expect("set position");
    let (events, _sub) = record(&editor);

    editor.set_value("new");

    assert_eq!(editor.value(), "new");
    assert_eq!(editor.position(), Some(Position::new(1, 1)));
    let reason = events.borrow().iter().find_map(|event| match event {
        EditorEvent::CursorSelectionChanged(change) => Some(change.reason),
        _ => None,
    });
    assert_eq!(reason, Some(CursorChangeReason::ContentFlush));
}

#[test]
fn test_model_dispose_detaches_on_next_sync() {
    let (mut editor, model) = attached("abc");
    let (events, _sub) = record(&editor);
    let id = model.borrow().id();

    model.borrow_mut().dispose();
    editor.sync_with_model();

    assert!(!editor.has_model());
    assert!(events.borrow().contains(&EditorEvent::ModelChanged {
        old_model: Some(id),
        new_model: None,
    }));
}

#[test]
fn test_read_only_config_blocks_typing() {
    let model = shared_model("abc");
    let config = EditorConfig {
        read_only: true,
        ..EditorConfig::default()
    };
    let mut editor = editor_with(config, &model);
    let (events, _sub) = record(&editor);

    editor.trigger("keyboard", EditorCommand::Type { text: "x".into() });
    editor.trigger("keyboard", EditorCommand::CursorMove {
        direction: CursorDirection::Right,
        select: false,
    });

    assert_eq!(model.borrow().value(), "abc");
    assert_eq!(editor.position(), Some(Position::new(1, 2)));
    assert_eq!(kinds(&events)[0], EditorEventKind::DidAttemptReadOnlyEdit);
}

#[test]
fn test_read_only_model_is_reported() {
    let model = Rc::new(RefCell::new(TextModel::with_options(
        "abc",
        TextModelOptions {
            read_only: true,
            ..TextModelOptions::default()
        },
    )));
    let editor = editor_with(EditorConfig::default(), &model);

    assert!(editor.is_read_only());
}

#[test]
fn test_cursor_ceiling_emits_event_and_caps() {
    let model = shared_model("a\nb\nc");
    let config = EditorConfig {
        max_cursor_count: 2,
        ..EditorConfig::default()
    };
    let mut editor = editor_with(config, &model);
    let (events, _sub) = record(&editor);

    editor
        .set_selections(
            "test",
            &[
                Selection::caret(Position::new(3, 1)),
                Selection::caret(Position::new(1, 1)),
                Selection::caret(Position::new(2, 1)),
            ],
        )
        .expect("set selections");

    let selections = editor.selections().expect("attached");
    assert_eq!(selections.len(), 2);
    assert_eq!(selections[0], Selection::caret(Position::new(3, 1)));
    assert!(events
        .borrow()
        .contains(&EditorEvent::ReachedMaxCursorCount { limit: 2 }));
}

#[test]
fn test_cursor_ceiling_warns_once_per_attachment() {
    let model = shared_model("a\nb\nc");
    let config = EditorConfig {
        max_cursor_count: 1,
        ..EditorConfig::default()
    };
    let mut editor = editor_with(config, &model);
    let (events, _sub) = record(&editor);
    let carets = [
        Selection::caret(Position::new(1, 1)),
        Selection::caret(Position::new(2, 1)),
    ];

    editor.set_selections("test", &carets).expect("first");
    editor.set_selections("test", &carets).expect("second");

    let warnings = kinds(&events)
        .into_iter()
        .filter(|kind| *kind == EditorEventKind::ReachedMaxCursorCount)
        .count();
    assert_eq!(warnings, 1);
    assert_eq!(editor.selections().expect("attached").len(), 1);
}

#[test]
fn test_layout_reclamps_scroll_top() {
    let model = shared_model(&numbered_lines(100));
    let config = EditorConfig {
        scroll_beyond_last_line: false,
        ..EditorConfig::default()
    };
    let mut editor = editor_with(config, &model);

    editor.set_scroll_top(5_000);
    assert_eq!(editor.scroll_top(), 1_200);

    let (events, _sub) = record(&editor);
    editor.layout(800, 1_200);

    assert_eq!(editor.scroll_top(), 600);
    assert_eq!(
        kinds(&events),
        vec![EditorEventKind::LayoutChanged, EditorEventKind::ScrollChanged]
    );
}

#[test]
fn test_unknown_named_command_is_ignored() {
    let (mut editor, _model) = attached("abc");
    let (events, _sub) = record(&editor);

    editor.trigger_named("api", "no.such.command", &Value::Null);
    editor.trigger_named("api", "type", &json!({ "unexpected": true }));

    assert_eq!(editor.value(), "abc");
    assert!(events.borrow().is_empty());
}

#[test]
fn test_named_command_runs_registered_action() {
    let (mut editor, _model) = attached("abc");
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    editor.add_action(EditorAction::new("demo.mark", "Mark", move |_: &Value| -> ActionFuture {
        let flag = flag.clone();
        Box::pin(async move {
            flag.store(true, AtomicOrdering::SeqCst);
            Ok(())
        })
    }));

    editor.trigger_named("api", "demo.mark", &Value::Null);

    assert!(ran.load(AtomicOrdering::SeqCst));
    assert_eq!(editor.supported_actions().len(), 1);
    assert!(editor.get_action("demo.mark").is_some());
    assert!(!editor.run_action("demo.missing", &Value::Null));
}

#[test]
fn test_undo_restores_content_and_selection() {
    let (mut editor, _model) = attached("abc");
    editor.trigger("keyboard", EditorCommand::Type { text: "xy".into() });
    assert!(editor.can_undo());

    editor.trigger("keyboard", EditorCommand::Undo);

    assert_eq!(editor.value(), "abc");
    assert_eq!(editor.position(), Some(Position::new(1, 1)));
    assert!(editor.can_redo());
}

struct Folding {
    folded: Vec<usize>,
}

impl EditorContribution for Folding {
    fn id(&self) -> &str {
        "folding"
    }

    fn save_view_state(&self) -> Option<Value> {
        Some(json!(self.folded))
    }

    fn restore_view_state(&mut self, state: &Value) {
        self.folded = serde_json::from_value(state.clone()).unwrap_or_default();
    }
}

#[test]
fn test_view_state_carries_contribution_state() {
    let (mut editor, model) = attached("a\nb\nc");
    editor.add_contribution(Box::new(Folding { folded: vec![2] }));
    let saved = editor.save_view_state().expect("attached");
    assert_eq!(saved.contributions_state.get("folding"), Some(&json!([2])));

    let mut other = editor_with(EditorConfig::default(), &model);
    other.add_contribution(Box::new(Folding { folded: Vec::new() }));
    other.restore_view_state(&saved).expect("restore");

    let restored = other.save_view_state().expect("attached");
    assert_eq!(restored.contributions_state, saved.contributions_state);
}

#[test]
fn test_geometry_queries_need_a_real_view() {
    let model = shared_model("hello\nworld");
    let mut headless = editor_with(EditorConfig::default(), &model);
    assert!(!headless.has_real_view());
    assert_eq!(headless.target_at_client_point(10, 10), None);
    assert_eq!(headless.scrolled_visible_position(Position::new(1, 1)), None);
    assert_eq!(headless.create_overview_ruler("ruler"), None);

    let mut viewed = CodeEditor::new(
        EditorConfig::default(),
        DecorationTypeService::shared(),
        Some(Rc::new(NullViewFactory)),
    );
    viewed.set_model(Some(model));
    assert!(viewed.has_real_view());

    // Line 2 starts at y=18; x=17 is closest to the boundary after "wo".
    let target = viewed.target_at_client_point(17, 20).expect("inside viewport");
    assert_eq!(target.kind, MouseTargetType::ContentText);
    assert_eq!(target.position, Position::new(2, 3));

    let beyond = viewed.target_at_client_point(200, 0).expect("inside viewport");
    assert_eq!(beyond.kind, MouseTargetType::ContentEmpty);
    assert_eq!(beyond.position, Position::new(1, 6));

    assert_eq!(
        viewed.create_overview_ruler("ruler"),
        Some(OverviewRuler {
            class_name: "ruler".into()
        })
    );
    viewed.focus();
    assert!(viewed.is_focused());
}

struct Anchored {
    queries: Cell<usize>,
}

impl ContentWidget for Anchored {
    fn id(&self) -> &str {
        "anchored"
    }

    fn position(&self) -> Option<ContentWidgetPosition> {
        self.queries.set(self.queries.get() + 1);
        Some(ContentWidgetPosition {
            position: Position::new(1, 1),
            preference: Vec::new(),
        })
    }
}

#[test]
fn test_widgets_survive_model_switches() {
    let mut editor = CodeEditor::new(
        EditorConfig::default(),
        DecorationTypeService::shared(),
        Some(Rc::new(NullViewFactory)),
    );
    let widget = Rc::new(Anchored { queries: Cell::new(0) });
    editor.add_content_widget(widget.clone());

    editor.set_model(Some(shared_model("a")));
    editor.set_model(Some(shared_model("b")));

    assert_eq!(editor.content_widget_count(), 1);
    assert_eq!(widget.queries.get(), 1);

    editor.layout_content_widget(widget.as_ref());
    assert_eq!(widget.queries.get(), 2);

    editor.remove_content_widget("anchored");
    assert_eq!(editor.content_widget_count(), 0);
}

#[test]
fn test_dispose_fires_disposed_and_blocks_reattach() {
    let (mut editor, model) = attached("abc");
    let (events, _sub) = record(&editor);

    editor.dispose();
    editor.set_model(Some(model.clone()));

    assert!(editor.is_disposed());
    assert!(!editor.has_model());
    assert_eq!(
        kinds(&events),
        vec![EditorEventKind::ModelChanged, EditorEventKind::Disposed]
    );
    assert_eq!(model.borrow().attached_editors(), 0);
}

#[test]
fn test_hidden_areas_shrink_visible_ranges() {
    let (mut editor, _model) = attached("a\nb\nc\nd");

    editor
        .set_hidden_areas(&[Range::from_coords(2, 1, 3, 1)])
        .expect("hide");

    assert_eq!(
        editor.visible_ranges(),
        vec![Range::from_coords(1, 1, 1, 2), Range::from_coords(4, 1, 4, 2)]
    );
    assert!(editor
        .set_hidden_areas(&[Range::from_coords(0, 1, 1, 1)])
        .is_err());
}

#[test]
fn test_fully_hidden_document_survives_reveal_and_typing() {
    let (mut editor, model) = attached("a\nb");
    editor
        .set_hidden_areas(&[Range::from_coords(1, 1, 2, 1)])
        .expect("hide");

    editor.reveal_position(Position::new(1, 1)).expect("reveal");
    editor.trigger("keyboard", EditorCommand::Type { text: "x".into() });

    assert_eq!(model.borrow().value(), "xa\nb");
    assert_eq!(editor.offset_for_column(1, 2), 0);
    assert_eq!(editor.scroll_left(), 0);
    assert!(editor.visible_ranges().is_empty());
}

#[test]
fn test_reveal_rejects_line_zero() {
    let (mut editor, _model) = attached("abc");

    assert!(matches!(editor.reveal_line(0), Err(EditorError::InvalidArgument(_))));
    assert!(editor.reveal_line(1).is_ok());
}
