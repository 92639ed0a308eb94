//! Mailbox commands and the cross-thread `EditorHandle`.
//!
//! Everything that reaches the editor from outside its owner thread goes
//! through one unbounded mailbox, so mutations, notifications and formatting
//! completions are totally ordered by arrival. The handle is cheap to clone
//! and `Send`; it is also what views receive in the attach handshake.

use crate::error::RuntimeError;
use crate::highlight::FormatCompletion;
use crate::settings::EditorSettings;
use core_events::Notification;
use core_state::EditorState;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum EditorCommand {
    Insert { text: String, cursor_offset: isize },
    Erase,
    Clear,
    SetText { text: String, selection: Option<usize> },
    SetState(EditorState),
    MoveCursorLeft,
    MoveCursorRight,
    CursorOnStart,
    CursorOnEnd,
    MoveSelection(isize),
    SetSelection(usize),
    Notify(Notification),
    Reconfigure(EditorSettings),
    /// Result of a formatting pass, delivered back onto the owner thread.
    FormatCompleted(FormatCompletion),
    /// Reply with the current state.
    Query(oneshot::Sender<EditorState>),
    /// Reply with the state once no formatting pass is pending.
    QuerySettled(oneshot::Sender<EditorState>),
    Shutdown,
}

impl EditorCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EditorCommand::Insert { .. } => "insert",
            EditorCommand::Erase => "erase",
            EditorCommand::Clear => "clear",
            EditorCommand::SetText { .. } => "set_text",
            EditorCommand::SetState(_) => "set_state",
            EditorCommand::MoveCursorLeft => "move_cursor_left",
            EditorCommand::MoveCursorRight => "move_cursor_right",
            EditorCommand::CursorOnStart => "cursor_on_start",
            EditorCommand::CursorOnEnd => "cursor_on_end",
            EditorCommand::MoveSelection(_) => "move_selection",
            EditorCommand::SetSelection(_) => "set_selection",
            EditorCommand::Notify(_) => "notify",
            EditorCommand::Reconfigure(_) => "reconfigure",
            EditorCommand::FormatCompleted(_) => "format_completed",
            EditorCommand::Query(_) => "query",
            EditorCommand::QuerySettled(_) => "query_settled",
            EditorCommand::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorHandle {
    tx: UnboundedSender<EditorCommand>,
}

impl EditorHandle {
    pub(crate) fn new(tx: UnboundedSender<EditorCommand>) -> Self {
        Self { tx }
    }

    pub fn send(&self, command: EditorCommand) -> Result<(), RuntimeError> {
        self.tx.send(command).map_err(|_| RuntimeError::Closed)
    }

    pub fn insert(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(EditorCommand::Insert {
            text: text.into(),
            cursor_offset: 0,
        })
    }

    pub fn erase(&self) -> Result<(), RuntimeError> {
        self.send(EditorCommand::Erase)
    }

    pub fn notify(&self, notification: Notification) -> Result<(), RuntimeError> {
        self.send(EditorCommand::Notify(notification))
    }

    pub fn reconfigure(&self, settings: EditorSettings) -> Result<(), RuntimeError> {
        self.send(EditorCommand::Reconfigure(settings))
    }

    pub fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(EditorCommand::Shutdown)
    }

    /// Current state, answered after every command queued before this call.
    pub async fn state(&self) -> Result<EditorState, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(EditorCommand::Query(tx))?;
        rx.await.map_err(|_| RuntimeError::ReplyDropped)
    }

    /// Blocking variant of `state` for callers outside any async runtime.
    pub fn blocking_state(&self) -> Result<EditorState, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(EditorCommand::Query(tx))?;
        rx.blocking_recv().map_err(|_| RuntimeError::ReplyDropped)
    }

    /// State after the pending formatting pass (if any) has been applied, so
    /// its `ChangedEvent` is published before the reply.
    pub async fn settled_state(&self) -> Result<EditorState, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(EditorCommand::QuerySettled(tx))?;
        rx.await.map_err(|_| RuntimeError::ReplyDropped)
    }

    pub fn blocking_settled_state(&self) -> Result<EditorState, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(EditorCommand::QuerySettled(tx))?;
        rx.blocking_recv().map_err(|_| RuntimeError::ReplyDropped)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
