//! Editor event types and the subscriber bus.
//!
//! Outbound: after every accepted transition the editor publishes an
//! `EditorEvent` to its `EventBus`. Text transitions produce
//! `EditorEvent::Changed`, selection-only transitions produce
//! `EditorEvent::CursorMoved`. Subscribers register explicitly and receive a
//! `SubscriptionId` they later hand back to `unsubscribe`; nothing is wired by
//! reflection or naming convention.
//!
//! Inbound: `Notification` carries the signals other subsystems send to the
//! editor (engine reconfigured, memory value ready, history loaded).
//!
//! The bus is owner-thread confined (`Rc` subscribers) and delivers
//! synchronously in registration order. `ChannelSubscriber` bridges to other
//! threads through a tokio unbounded channel.

use core_state::{EditorState, RecentHistory};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;

// Telemetry: simple relaxed counters, inspected in tests or logged on shutdown.
pub static EVENTS_PUBLISHED: AtomicU64 = AtomicU64::new(0);
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);

/// A text transition: `old` was replaced by `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedEvent {
    pub old: EditorState,
    pub new: EditorState,
    /// Forces downstream re-evaluation even when the text is unchanged
    /// (e.g. formatting rules changed).
    pub force: bool,
}

impl ChangedEvent {
    pub fn new(old: EditorState, new: EditorState, force: bool) -> Self {
        Self { old, new, force }
    }

    /// Whether the expression needs evaluating again.
    pub fn should_evaluate(&self) -> bool {
        self.force || self.old.text() != self.new.text()
    }
}

/// A selection-only transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorMovedEvent {
    pub state: EditorState,
}

impl CursorMovedEvent {
    pub fn new(state: EditorState) -> Self {
        Self { state }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Changed(ChangedEvent),
    CursorMoved(CursorMovedEvent),
}

impl EditorEvent {
    /// State after the transition.
    pub fn state(&self) -> &EditorState {
        match self {
            EditorEvent::Changed(e) => &e.new,
            EditorEvent::CursorMoved(e) => &e.state,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorEvent::Changed(_) => "changed",
            EditorEvent::CursorMoved(_) => "cursor_moved",
        }
    }
}

/// Signals other subsystems deliver to the editor.
#[derive(Debug, Clone)]
pub enum Notification {
    /// Engine configuration changed (grouping separator etc.); re-format and re-evaluate.
    EngineChanged,
    /// A memory recall produced a value to insert as if typed.
    MemoryValueReady(String),
    /// History finished loading; restore the latest entry if the input is empty.
    HistoryLoaded(RecentHistory),
}

/// Receives editor events on the owner thread. Must not block.
pub trait EventSubscriber {
    fn on_event(&self, event: &EditorEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of subscribers.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Rc<dyn EventSubscriber>)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Rc<dyn EventSubscriber>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, subscriber));
        tracing::debug!(target: "events", id = id.0, total = self.subscribers.len(), "subscribed");
        id
    }

    /// Remove a subscriber. Returns `false` for an unknown (or already removed) id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        let removed = self.subscribers.len() != before;
        tracing::debug!(target: "events", id = id.0, removed, "unsubscribed");
        removed
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn publish(&self, event: &EditorEvent) {
        EVENTS_PUBLISHED.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            target: "events",
            kind = event.name(),
            subscribers = self.subscribers.len(),
            "publish"
        );
        for (_, subscriber) in &self.subscribers {
            subscriber.on_event(event);
        }
    }
}

/// Forwards events into a tokio channel so consumers on other threads
/// (evaluation, history, the CLI) can await them.
pub struct ChannelSubscriber {
    tx: UnboundedSender<EditorEvent>,
}

impl ChannelSubscriber {
    pub fn new(tx: UnboundedSender<EditorEvent>) -> Self {
        Self { tx }
    }
}

impl EventSubscriber for ChannelSubscriber {
    fn on_event(&self, event: &EditorEvent) {
        if self.tx.send(event.clone()).is_err() {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(target: "events", kind = event.name(), "channel_closed");
        }
    }
}
