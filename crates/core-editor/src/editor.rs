//! The editor engine: one state slot, one pending formatting pass.
//!
//! Transition kinds:
//! - Text transitions (`insert`, `erase`, `set_text`, `set_state`, forced
//!   re-transitions) set the new state immediately, so a caller reading
//!   `state()` right after a mutation sees it, then start a formatting pass.
//!   Without a formatter (or with empty text) the pass completes
//!   synchronously. On completion the final state goes to the view and a
//!   `ChangedEvent` is published.
//! - Selection transitions bypass formatting: set, push to view, publish
//!   `CursorMovedEvent`.
//!
//! Invariants (must hold after every public call):
//! - `state.selection <= char_len(state.text)`.
//! - At most one `HighlightTask` is pending; its generation is the latest one
//!   issued by the clock.
//! - Every entry point runs on the owner thread (the type is `!Send`).

use crate::command::{EditorCommand, EditorHandle};
use crate::highlight::{
    FormatCompletion, FormatExecutor, FormatJob, GenerationClock, HighlightTask, InlineExecutor,
};
use crate::owner::OwnerThread;
use crate::settings::EditorSettings;
use crate::view::EditorView;
use core_events::{
    ChangedEvent, CursorMovedEvent, EditorEvent, EventBus, EventSubscriber, Notification,
    SubscriptionId,
};
use core_state::{EditorState, RecentHistory};
use core_text::{
    Formatter, GroupingFormatter, MathClassifier, SplitText, TokenClassifier, TokenKind, char_len,
    clamp, split_at,
};
use std::borrow::Cow;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::oneshot;
use tracing::{debug, info, trace};

pub struct Editor {
    state: EditorState,
    view: Option<Rc<dyn EditorView>>,
    classifier: Box<dyn TokenClassifier>,
    formatter: Option<Arc<dyn Formatter>>,
    executor: Box<dyn FormatExecutor>,
    pending: Option<HighlightTask>,
    /// `QuerySettled` replies held back until `pending` clears.
    settled_waiters: Vec<oneshot::Sender<EditorState>>,
    clock: GenerationClock,
    bus: EventBus,
    handle: EditorHandle,
    /// Present for standalone editors; the runtime owns the receiver otherwise.
    mailbox: Option<UnboundedReceiver<EditorCommand>>,
    owner: OwnerThread,
}

fn formatter_for(settings: &EditorSettings) -> Option<Arc<dyn Formatter>> {
    if settings.highlight {
        Some(Arc::new(GroupingFormatter::new(settings.format)))
    } else {
        None
    }
}

impl Editor {
    /// Standalone editor with its own mailbox and an `InlineExecutor`.
    /// Formatting completions are applied by `run_pending`.
    pub fn new(settings: EditorSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self::build(settings, EditorHandle::new(tx), Some(rx))
    }

    /// Editor driven by an external mailbox (see `EditorRuntime`).
    pub(crate) fn attached(settings: EditorSettings, handle: EditorHandle) -> Self {
        Self::build(settings, handle, None)
    }

    fn build(
        settings: EditorSettings,
        handle: EditorHandle,
        mailbox: Option<UnboundedReceiver<EditorCommand>>,
    ) -> Self {
        Self {
            state: EditorState::empty(),
            view: None,
            classifier: Box::new(MathClassifier::new(settings.format)),
            formatter: formatter_for(&settings),
            executor: Box::new(InlineExecutor),
            pending: None,
            settled_waiters: Vec::new(),
            clock: GenerationClock::default(),
            bus: EventBus::new(),
            handle,
            mailbox,
            owner: OwnerThread::current(),
        }
    }

    pub fn with_executor(mut self, executor: impl FormatExecutor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn set_classifier(&mut self, classifier: impl TokenClassifier + 'static) {
        self.owner.check();
        self.classifier = Box::new(classifier);
    }

    /// `None` disables the formatting pass.
    pub fn set_formatter(&mut self, formatter: Option<Arc<dyn Formatter>>) {
        self.owner.check();
        self.formatter = formatter;
    }

    pub fn handle(&self) -> EditorHandle {
        self.handle.clone()
    }

    pub fn subscribe(&mut self, subscriber: Rc<dyn EventSubscriber>) -> SubscriptionId {
        self.owner.check();
        self.bus.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.owner.check();
        self.bus.unsubscribe(id)
    }

    /// A formatting pass has started and not yet been applied.
    pub fn has_pending_format(&self) -> bool {
        self.pending.is_some()
    }

    // ---------------------------------------------------------------------------------------------
    // View
    // ---------------------------------------------------------------------------------------------

    pub fn set_view(&mut self, view: Rc<dyn EditorView>) {
        self.owner.check();
        view.set_state(&self.state);
        view.set_editor(Some(self.handle.clone()));
        if self.view.replace(view).is_some() {
            debug!(target: "editor.view", "view_replaced");
        }
    }

    /// Detach `view`. No-op unless it is the attached one.
    pub fn clear_view(&mut self, view: &Rc<dyn EditorView>) {
        self.owner.check();
        if self.view.as_ref().is_some_and(|v| Rc::ptr_eq(v, view)) {
            view.set_editor(None);
            self.view = None;
        } else {
            trace!(target: "editor.view", "clear_view_ignored_stale");
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Text transitions
    // ---------------------------------------------------------------------------------------------

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Replace the whole state (e.g. restoring from history).
    pub fn set_state(&mut self, state: EditorState) {
        self.owner.check();
        self.on_text_changed(state, false);
    }

    /// Replace the text; the cursor goes where the view's selection ends
    /// (or to the end of the text when no view is attached).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.owner.check();
        let text = text.into();
        let selection = match &self.view {
            Some(view) => view.selection_end(),
            None => char_len(&text),
        };
        self.on_text_changed(EditorState::create(text, selection), false);
    }

    pub fn set_text_with_selection(&mut self, text: impl Into<String>, selection: usize) {
        self.owner.check();
        self.on_text_changed(EditorState::create(text, selection), false);
    }

    pub fn clear(&mut self) {
        self.owner.check();
        self.set_text(String::new());
    }

    pub fn insert(&mut self, text: &str) {
        self.insert_with_offset(text, 0);
    }

    /// Insert `text` at the cursor (or over the selection).
    ///
    /// `cursor_offset` (usually <= 0) moves the split point of `text` left of
    /// its end; the selected text, if kept, is plugged in at that point and
    /// the cursor lands there. A digit replaces the selection. A binary
    /// operator wraps it in parentheses: selecting `6+7` in `5*6+7*8` and
    /// inserting `^2` gives `5*(6+7)^2|*8`.
    pub fn insert_with_offset(&mut self, text: &str, cursor_offset: isize) {
        self.owner.check();
        if text.is_empty() && cursor_offset == 0 {
            return;
        }
        let kind = self.classifier.classify(text, 0);
        let split = self.split();

        let delete_selection = split.text_selected && kind == TokenKind::Digit;
        let (to_insert, cursor_offset) = if split.text_selected && kind == TokenKind::BinaryOperator {
            let wrapped = format!("(){text}");
            let offset = 1 - char_len(&wrapped) as isize;
            (Cow::Owned(wrapped), offset)
        } else {
            (Cow::Borrowed(text), cursor_offset)
        };

        let inserted_len = char_len(&to_insert);
        // Local position inside `to_insert` where the selection is plugged in.
        let plugin_pos = clamp(inserted_len as isize + cursor_offset, inserted_len);
        let (insert_left, insert_right) = split_at(&to_insert, plugin_pos);
        let text_mid = split.text_mid(delete_selection);

        let new_text = [
            split.text_left,
            insert_left,
            text_mid,
            insert_right,
            split.text_right,
        ]
        .concat();

        let mut cursor = char_len(split.text_left) + char_len(insert_left) + char_len(text_mid);
        if split.text_selected {
            cursor += char_len(insert_right);
        }
        let cursor = cursor.min(char_len(&new_text));

        trace!(
            target: "editor.transition",
            ?kind,
            selected = split.text_selected,
            delete_selection,
            plugin_pos,
            cursor,
            "insert"
        );
        self.on_text_changed(EditorState::create(new_text, cursor), false);
    }

    /// Backspace. Deletes the selection if any, else the char left of the
    /// cursor (two chars when that char is a grouping separator).
    ///
    /// Returns `false` without touching state when there is nothing to erase;
    /// otherwise whether the resulting text is non-empty.
    pub fn erase(&mut self) -> bool {
        self.owner.check();
        let del_pos = self.state.selection();
        let len = self.state.len();
        if del_pos == 0 || len == 0 || del_pos > len {
            return false;
        }
        let split = self.split();
        let text_left = split.del_text_left(self.classifier.as_ref());
        let new_text = [text_left, split.text_mid(true), split.text_right].concat();
        let cursor = char_len(text_left);
        let non_empty = !new_text.is_empty();
        self.on_text_changed(EditorState::create(new_text, cursor), false);
        non_empty
    }

    fn split(&self) -> SplitText<'_> {
        let text = self.state.text();
        let cursor = self.state.selection();
        match &self.view {
            Some(view) => SplitText::new(text, cursor, view.selection_start(), view.selection_end()),
            None => SplitText::at_cursor(text, cursor),
        }
    }

    fn on_text_changed(&mut self, new_state: EditorState, force: bool) {
        self.owner.check();
        // The synchronous state is visible right away, whatever the formatter does.
        let old = std::mem::replace(&mut self.state, new_state.clone());

        if let Some(stale) = self.pending.take() {
            trace!(target: "editor.highlight", generation = stale.generation, "superseded");
        }
        let generation = self.clock.advance();
        debug!(
            target: "editor.transition",
            generation,
            force,
            old_len = old.len(),
            new_len = new_state.len(),
            selection = new_state.selection(),
            "text_changed"
        );

        let formatter = self.formatter.clone().filter(|_| !new_state.is_empty());
        self.pending = Some(HighlightTask {
            generation,
            old,
            new: new_state.clone(),
            force,
        });
        match formatter {
            Some(formatter) => {
                let job = FormatJob::new(generation, new_state, formatter, self.clock.watch());
                self.executor.execute(job, self.handle.clone());
            }
            None => self.finish_highlight(generation, None),
        }
    }

    /// Apply a formatting result delivered back onto the owner thread.
    pub fn complete_format(&mut self, completion: FormatCompletion) {
        self.owner.check();
        self.finish_highlight(completion.generation, Some(completion.state));
    }

    fn finish_highlight(&mut self, generation: u64, formatted: Option<EditorState>) {
        let Some(task) = self.pending.take_if(|t| t.generation == generation) else {
            trace!(
                target: "editor.highlight",
                generation,
                pending = ?self.pending.as_ref().map(|t| t.generation),
                "stale_completion_discarded"
            );
            return;
        };
        let state = formatted.unwrap_or(task.new);
        self.state = state.clone();
        if let Some(view) = &self.view {
            view.set_state(&state);
        }
        self.bus
            .publish(&EditorEvent::Changed(ChangedEvent::new(task.old, state, task.force)));
        self.release_settled_waiters();
    }

    fn release_settled_waiters(&mut self) {
        if self.settled_waiters.is_empty() {
            return;
        }
        trace!(target: "editor.command", waiters = self.settled_waiters.len(), "settled");
        for reply in self.settled_waiters.drain(..) {
            let _ = reply.send(self.state.clone());
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Selection transitions
    // ---------------------------------------------------------------------------------------------

    fn on_selection_changed(&mut self, new_state: EditorState) -> &EditorState {
        self.owner.check();
        self.state = new_state;
        if let Some(view) = &self.view {
            view.set_state(&self.state);
        }
        trace!(target: "editor.selection", selection = self.state.selection(), "cursor_moved");
        self.bus
            .publish(&EditorEvent::CursorMoved(CursorMovedEvent::new(self.state.clone())));
        &self.state
    }

    fn new_selection_state(&mut self, selection: usize) -> &EditorState {
        if self.state.selection() == selection {
            return &self.state;
        }
        let next = EditorState::for_new_selection(&self.state, selection);
        self.on_selection_changed(next)
    }

    pub fn set_cursor_on_start(&mut self) -> &EditorState {
        self.owner.check();
        self.new_selection_state(0)
    }

    pub fn set_cursor_on_end(&mut self) -> &EditorState {
        self.owner.check();
        let end = self.state.len();
        self.new_selection_state(end)
    }

    pub fn move_cursor_left(&mut self) -> &EditorState {
        self.owner.check();
        match self.state.selection() {
            0 => &self.state,
            sel => self.new_selection_state(sel - 1),
        }
    }

    pub fn move_cursor_right(&mut self) -> &EditorState {
        self.owner.check();
        let sel = self.state.selection();
        if sel >= self.state.len() {
            return &self.state;
        }
        self.new_selection_state(sel + 1)
    }

    pub fn move_selection(&mut self, offset: isize) -> &EditorState {
        self.owner.check();
        let target = clamp(self.state.selection() as isize + offset, self.state.len());
        self.set_selection(target)
    }

    /// Clamped into the text first; landing on the current position is a no-op.
    pub fn set_selection(&mut self, selection: usize) -> &EditorState {
        self.owner.check();
        let clamped = selection.min(self.state.len());
        self.new_selection_state(clamped)
    }

    // ---------------------------------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------------------------------

    /// Engine rules changed: re-run formatting on the current state and force
    /// downstream re-evaluation even though the text is unchanged.
    pub fn on_engine_changed(&mut self) {
        self.owner.check();
        let current = self.state.clone();
        self.on_text_changed(current, true);
    }

    pub fn on_memory_value_ready(&mut self, value: &str) {
        self.insert(value);
    }

    /// Restore the latest history entry, only when the input is empty.
    pub fn on_history_loaded(&mut self, history: &RecentHistory) {
        self.owner.check();
        if !self.state.is_empty() {
            return;
        }
        let Some(entry) = history.current() else {
            return;
        };
        self.set_state(entry.editor.clone());
    }

    pub fn handle_notification(&mut self, notification: Notification) {
        match notification {
            Notification::EngineChanged => self.on_engine_changed(),
            Notification::MemoryValueReady(value) => self.on_memory_value_ready(&value),
            Notification::HistoryLoaded(history) => self.on_history_loaded(&history),
        }
    }

    /// Swap in a classifier and formatter for `settings` (replacing any custom
    /// ones) and force a re-transition so the new rules apply.
    pub fn reconfigure(&mut self, settings: EditorSettings) {
        self.owner.check();
        self.classifier = Box::new(MathClassifier::new(settings.format));
        self.formatter = formatter_for(&settings);
        info!(
            target: "editor",
            grouping_separator = ?settings.format.grouping_separator,
            decimal_point = %settings.format.decimal_point,
            highlight = settings.highlight,
            "reconfigured"
        );
        self.on_engine_changed();
    }

    // ---------------------------------------------------------------------------------------------
    // Mailbox
    // ---------------------------------------------------------------------------------------------

    /// Apply one mailbox command. `Break` means the owner loop should stop.
    pub fn handle_command(&mut self, command: EditorCommand) -> ControlFlow<()> {
        trace!(target: "editor.command", command = command.name(), "handle");
        match command {
            EditorCommand::Insert {
                text,
                cursor_offset,
            } => self.insert_with_offset(&text, cursor_offset),
            EditorCommand::Erase => {
                self.erase();
            }
            EditorCommand::Clear => self.clear(),
            EditorCommand::SetText { text, selection } => match selection {
                Some(selection) => self.set_text_with_selection(text, selection),
                None => self.set_text(text),
            },
            EditorCommand::SetState(state) => self.set_state(state),
            EditorCommand::MoveCursorLeft => {
                self.move_cursor_left();
            }
            EditorCommand::MoveCursorRight => {
                self.move_cursor_right();
            }
            EditorCommand::CursorOnStart => {
                self.set_cursor_on_start();
            }
            EditorCommand::CursorOnEnd => {
                self.set_cursor_on_end();
            }
            EditorCommand::MoveSelection(offset) => {
                self.move_selection(offset);
            }
            EditorCommand::SetSelection(selection) => {
                self.set_selection(selection);
            }
            EditorCommand::Notify(notification) => self.handle_notification(notification),
            EditorCommand::Reconfigure(settings) => self.reconfigure(settings),
            EditorCommand::FormatCompleted(completion) => self.complete_format(completion),
            EditorCommand::Query(reply) => {
                if reply.send(self.state.clone()).is_err() {
                    trace!(target: "editor.command", "query_receiver_dropped");
                }
            }
            EditorCommand::QuerySettled(reply) => {
                if self.pending.is_some() {
                    self.settled_waiters.push(reply);
                } else if reply.send(self.state.clone()).is_err() {
                    trace!(target: "editor.command", "query_receiver_dropped");
                }
            }
            EditorCommand::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Drain commands queued on a standalone editor's mailbox (formatting
    /// completions from `InlineExecutor` included). Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        self.owner.check();
        let mut handled = 0;
        while let Some(command) = self.mailbox.as_mut().and_then(|rx| rx.try_recv().ok()) {
            handled += 1;
            if self.handle_command(command).is_break() {
                break;
            }
        }
        handled
    }
}
