//! Headless driver: loads a file into an editor, replays a JSON script of
//! commands and prints the resulting text, selections and view state.
//!
//! ```text
//! zcode-widget <file> [script.json] [--config <config.json>] [--log]
//! ```

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use zcode_widget::kernel::{ResultingSelection, VerticalRevealType};
use zcode_widget::models::SingleEditOperation;
use zcode_widget::views::ViewState;
use zcode_widget::{
    CodeEditor, DecorationTypeService, EditorConfig, EditorError, Range, Result, Selection, TextModel,
};

mod logging;

/// One scripted step.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum Step {
    Trigger {
        handler: String,
        #[serde(default)]
        payload: Value,
    },
    SetSelections {
        selections: Vec<[usize; 4]>,
    },
    ExecuteEdits {
        edits: Vec<ScriptEdit>,
    },
    SetHiddenAreas {
        ranges: Vec<[usize; 4]>,
    },
    RevealLine {
        line: usize,
        #[serde(default)]
        reveal: VerticalRevealType,
    },
    Layout {
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Deserialize)]
struct ScriptEdit {
    range: [usize; 4],
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    text: String,
    selections: Vec<Selection>,
    view_state: Option<ViewState>,
}

struct Args {
    file: PathBuf,
    script: Option<PathBuf>,
    config: Option<PathBuf>,
    echo_log: bool,
}

fn parse_args() -> Option<Args> {
    let mut file = None;
    let mut script = None;
    let mut config = None;
    let mut echo_log = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next()?)),
            "--log" => echo_log = true,
            _ if file.is_none() => file = Some(PathBuf::from(arg)),
            _ if script.is_none() => script = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }
    Some(Args {
        file: file?,
        script,
        config,
        echo_log,
    })
}

fn range_of(coords: [usize; 4]) -> Range {
    Range::from_coords(coords[0], coords[1], coords[2], coords[3])
}

fn load_script(path: &Path) -> Result<Vec<Step>> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn apply(editor: &mut CodeEditor, step: Step) -> Result<()> {
    match step {
        Step::Trigger { handler, payload } => editor.trigger_named("script", &handler, &payload),
        Step::SetSelections { selections } => {
            let selections: Vec<Selection> = selections
                .into_iter()
                .map(|[al, ac, l, c]| Selection::from_coords(al, ac, l, c))
                .collect();
            editor.set_selections("script", &selections)?;
        }
        Step::ExecuteEdits { edits } => {
            let edits = edits
                .into_iter()
                .map(|edit| SingleEditOperation::new(range_of(edit.range), edit.text))
                .collect();
            if !editor.execute_edits("script", edits, ResultingSelection::CaretAfterEdits)? {
                tracing::warn!("script edits were not applied");
            }
        }
        Step::SetHiddenAreas { ranges } => {
            let ranges: Vec<Range> = ranges.into_iter().map(range_of).collect();
            editor.set_hidden_areas(&ranges)?;
        }
        Step::RevealLine { line, reveal } => editor.reveal_lines_with(line, line, reveal)?,
        Step::Layout { width, height } => editor.layout(width, height),
    }
    Ok(())
}

fn run(args: &Args) -> Result<Report> {
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let text = std::fs::read_to_string(&args.file)?;
    let steps = match &args.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let model = Rc::new(RefCell::new(TextModel::new(&text)));
    let mut editor = CodeEditor::new(config, DecorationTypeService::shared(), None);
    editor.set_model(Some(model));

    for (index, step) in steps.into_iter().enumerate() {
        tracing::debug!(index, ?step, "apply step");
        apply(&mut editor, step).map_err(|err| EditorError::invalid(format!("step {index}: {err}")))?;
    }

    let report = Report {
        text: editor.value(),
        selections: editor.selections().unwrap_or_default(),
        view_state: editor.save_view_state(),
    };
    editor.dispose();
    Ok(report)
}

fn main() -> ExitCode {
    let Some(args) = parse_args() else {
        eprintln!("usage: zcode-widget <file> [script.json] [--config <config.json>] [--log]");
        return ExitCode::from(2);
    };
    let mut guard = logging::init();

    let result = run(&args).and_then(|report| Ok(serde_json::to_string_pretty(&report)?));

    if args.echo_log {
        if let Some(guard) = guard.as_mut() {
            let mut stderr = io::stderr().lock();
            let _ = writeln!(stderr, "log dir: {}", guard.log_dir().display());
            for line in guard.drain_lines() {
                let _ = writeln!(stderr, "{line}");
            }
        }
    }

    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
