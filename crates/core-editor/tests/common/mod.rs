#![allow(dead_code)] // Shared across test binaries; each uses a subset of helpers.

use core_editor::{Editor, EditorHandle, EditorSettings, EditorView, FormatExecutor, FormatJob};
use core_events::{ChangedEvent, CursorMovedEvent, EditorEvent, EventSubscriber};
use core_state::EditorState;
use core_text::NumberFormat;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

/// Records every published event.
#[derive(Default)]
pub struct Recorder {
    events: RefCell<Vec<EditorEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.borrow().clone()
    }

    pub fn changed(&self) -> Vec<ChangedEvent> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                EditorEvent::Changed(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn cursor_moves(&self) -> Vec<CursorMovedEvent> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                EditorEvent::CursorMoved(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventSubscriber for Recorder {
    fn on_event(&self, event: &EditorEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Widget stand-in. Like a real text field, pushing a state collapses the
/// selection onto the state's cursor.
#[derive(Default)]
pub struct FakeView {
    selection: Cell<(usize, usize)>,
    pushed: RefCell<Vec<EditorState>>,
    attached: Cell<Option<bool>>,
}

impl FakeView {
    pub fn select(&self, start: usize, end: usize) {
        self.selection.set((start, end));
    }

    pub fn selection_bounds(&self) -> (usize, usize) {
        self.selection.get()
    }

    pub fn pushed(&self) -> Vec<EditorState> {
        self.pushed.borrow().clone()
    }

    pub fn last_pushed(&self) -> Option<EditorState> {
        self.pushed.borrow().last().cloned()
    }

    /// `Some(true)` after attach, `Some(false)` after detach, `None` if never told.
    pub fn attached(&self) -> Option<bool> {
        self.attached.get()
    }
}

impl EditorView for FakeView {
    fn selection_start(&self) -> usize {
        self.selection.get().0
    }

    fn selection_end(&self) -> usize {
        self.selection.get().1
    }

    fn set_state(&self, state: &EditorState) {
        self.selection.set((state.selection(), state.selection()));
        self.pushed.borrow_mut().push(state.clone());
    }

    fn set_editor(&self, editor: Option<EditorHandle>) {
        self.attached.set(Some(editor.is_some()));
    }
}

/// Queues jobs so tests decide when (and in which order) they complete.
#[derive(Clone, Default)]
pub struct ManualExecutor {
    jobs: Rc<RefCell<VecDeque<FormatJob>>>,
}

impl ManualExecutor {
    pub fn queued(&self) -> usize {
        self.jobs.borrow().len()
    }

    pub fn take(&self) -> FormatJob {
        self.jobs.borrow_mut().pop_front().expect("a queued format job")
    }
}

impl FormatExecutor for ManualExecutor {
    fn execute(&self, job: FormatJob, _reply: EditorHandle) {
        self.jobs.borrow_mut().push_back(job);
    }
}

pub fn spaced() -> NumberFormat {
    NumberFormat::new(Some(' '), '.')
}

/// Editor without a formatter: every text transition completes synchronously.
pub fn plain_editor() -> (Editor, Rc<Recorder>) {
    let mut editor = Editor::new(EditorSettings::new(spaced(), false));
    let recorder = Rc::new(Recorder::default());
    editor.subscribe(recorder.clone());
    (editor, recorder)
}

/// Plain editor with `text` and cursor at `selection`, events cleared.
pub fn plain_editor_with(text: &str, selection: usize) -> (Editor, Rc<Recorder>) {
    let (mut editor, recorder) = plain_editor();
    editor.set_text_with_selection(text, selection);
    recorder.clear();
    (editor, recorder)
}

/// Plain editor with an attached view.
pub fn viewed_editor_with(text: &str, selection: usize) -> (Editor, Rc<FakeView>, Rc<Recorder>) {
    let (mut editor, recorder) = plain_editor_with(text, selection);
    let view = Rc::new(FakeView::default());
    editor.set_view(view.clone());
    (editor, view, recorder)
}

/// Editor with the grouping formatter and a manual executor.
pub fn formatting_editor() -> (Editor, ManualExecutor, Rc<Recorder>) {
    let executor = ManualExecutor::default();
    let mut editor = Editor::new(EditorSettings::new(spaced(), true)).with_executor(executor.clone());
    let recorder = Rc::new(Recorder::default());
    editor.subscribe(recorder.clone());
    (editor, executor, recorder)
}

struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

/// Run `f` with a trace-level subscriber and return everything it logged.
pub fn captured_logs<F: FnOnce()>(f: F) -> String {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: buffer.clone(),
        })
        .finish();
    with_default(subscriber, f);
    let bytes = buffer.lock().expect("log buffer poisoned").clone();
    String::from_utf8(bytes).expect("utf-8 log output")
}
