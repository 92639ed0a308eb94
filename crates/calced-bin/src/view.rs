use core_editor::{EditorHandle, EditorView};
use core_state::EditorState;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Selection bounds shared between the stdin loop (writer) and the view on
/// the editor's owner thread (reader).
#[derive(Debug, Default)]
pub struct ConsoleSelection {
    start: AtomicUsize,
    end: AtomicUsize,
}

impl ConsoleSelection {
    pub fn select(&self, start: usize, end: usize) {
        self.start.store(start, Ordering::Release);
        self.end.store(end, Ordering::Release);
    }

    pub fn bounds(&self) -> (usize, usize) {
        (
            self.start.load(Ordering::Acquire),
            self.end.load(Ordering::Acquire),
        )
    }
}

/// Behaves like a text field: accepting a state collapses the selection
/// onto its cursor.
pub struct ConsoleView {
    selection: Arc<ConsoleSelection>,
}

impl ConsoleView {
    pub fn new(selection: Arc<ConsoleSelection>) -> Self {
        Self { selection }
    }
}

impl EditorView for ConsoleView {
    fn selection_start(&self) -> usize {
        self.selection.bounds().0
    }

    fn selection_end(&self) -> usize {
        self.selection.bounds().1
    }

    fn set_state(&self, state: &EditorState) {
        self.selection.select(state.selection(), state.selection());
    }

    fn set_editor(&self, editor: Option<EditorHandle>) {
        debug!(target: "view.console", attached = editor.is_some(), "editor_handshake");
    }
}
