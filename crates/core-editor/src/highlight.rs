//! Formatting pass bookkeeping: generations, jobs, executors.
//!
//! Every text transition takes a fresh generation from `GenerationClock`.
//! The editor remembers the generation of the one pending task; a completion
//! is applied only when its generation still matches, so a late result from a
//! superseded pass is dropped instead of clobbering newer text. Cancellation is
//! logical: a running job is never interrupted, though a job that has not yet
//! started checks the shared clock and skips the formatter when it is already
//! stale.
//!
//! `FormatExecutor` decides where a job runs. Executors never touch editor
//! state; they post the completion to the editor's mailbox and the owner
//! thread applies it.

use crate::command::{EditorCommand, EditorHandle};
use core_state::EditorState;
use core_text::Formatter;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Monotonic transition counter shared with in-flight jobs.
#[derive(Debug, Default)]
pub(crate) struct GenerationClock {
    latest: Arc<AtomicU64>,
}

impl GenerationClock {
    /// Start a new generation, superseding the previous one.
    pub(crate) fn advance(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    pub(crate) fn watch(&self) -> Arc<AtomicU64> {
        self.latest.clone()
    }
}

/// The one pending transition awaiting its formatting result.
#[derive(Debug, Clone)]
pub(crate) struct HighlightTask {
    pub generation: u64,
    pub old: EditorState,
    pub new: EditorState,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCompletion {
    pub generation: u64,
    pub state: EditorState,
}

/// A formatting pass to run off the owner thread.
pub struct FormatJob {
    generation: u64,
    state: EditorState,
    formatter: Arc<dyn Formatter>,
    latest: Arc<AtomicU64>,
}

impl fmt::Debug for FormatJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatJob")
            .field("generation", &self.generation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl FormatJob {
    pub(crate) fn new(
        generation: u64,
        state: EditorState,
        formatter: Arc<dyn Formatter>,
        latest: Arc<AtomicU64>,
    ) -> Self {
        Self {
            generation,
            state,
            formatter,
            latest,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// State the pass will format.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// A newer transition has started since this job was created.
    pub fn is_stale(&self) -> bool {
        self.latest.load(Ordering::Acquire) != self.generation
    }

    /// Run the formatter. Returns `None` (skipping the work) when already stale.
    pub fn run(self) -> Option<FormatCompletion> {
        if self.is_stale() {
            trace!(target: "editor.highlight", generation = self.generation, "job_skipped_stale");
            return None;
        }
        let formatted = self.formatter.process(self.state.text());
        let selection = self
            .formatter
            .map_cursor(self.state.text(), self.state.selection(), &formatted);
        Some(FormatCompletion {
            generation: self.generation,
            state: EditorState::create(formatted.text, selection),
        })
    }
}

/// Where formatting jobs run.
pub trait FormatExecutor {
    /// Run `job` and post its completion through `reply`.
    fn execute(&self, job: FormatJob, reply: EditorHandle);
}

/// Runs the formatter on the calling thread but still delivers through the
/// mailbox, so completions apply on the next `Editor::run_pending`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl FormatExecutor for InlineExecutor {
    fn execute(&self, job: FormatJob, reply: EditorHandle) {
        let generation = job.generation();
        if let Some(completion) = job.run()
            && reply.send(EditorCommand::FormatCompleted(completion)).is_err()
        {
            debug!(target: "editor.highlight", generation, "reply_mailbox_closed");
        }
    }
}

/// Runs jobs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct BlockingPoolExecutor {
    runtime: tokio::runtime::Handle,
}

impl BlockingPoolExecutor {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }
}

impl FormatExecutor for BlockingPoolExecutor {
    fn execute(&self, job: FormatJob, reply: EditorHandle) {
        let generation = job.generation();
        self.runtime.spawn_blocking(move || {
            let Some(completion) = job.run() else {
                return;
            };
            if reply.send(EditorCommand::FormatCompleted(completion)).is_err() {
                debug!(target: "editor.highlight", generation, "reply_mailbox_closed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{GroupingFormatter, NumberFormat};

    fn job(clock: &GenerationClock, text: &str, sel: usize) -> FormatJob {
        let generation = clock.advance();
        FormatJob::new(
            generation,
            EditorState::create(text, sel),
            Arc::new(GroupingFormatter::new(NumberFormat::default())),
            clock.watch(),
        )
    }

    #[test]
    fn generations_increase() {
        let clock = GenerationClock::default();
        let a = clock.advance();
        let b = clock.advance();
        assert!(b > a);
    }

    #[test]
    fn run_maps_cursor_through_formatter() {
        let clock = GenerationClock::default();
        let done = job(&clock, "1234", 4).run().expect("current job runs");
        assert_eq!(done.state, EditorState::create("1 234", 5));
    }

    #[test]
    fn removed_separator_before_cursor_start() {
        let clock = GenerationClock::default();
        let done = job(&clock, "1 23", 0).run().unwrap();
        assert_eq!(done.state, EditorState::create("123", 0));
    }

    #[test]
    fn cursor_before_regrouped_digits_keeps_its_place() {
        let clock = GenerationClock::default();
        let done = job(&clock, "1234567", 1).run().unwrap();
        assert_eq!(done.state, EditorState::create("1 234 567", 1));
    }

    #[test]
    fn stale_job_skips_formatter() {
        let clock = GenerationClock::default();
        let first = job(&clock, "1234", 4);
        let _second = job(&clock, "12345", 5);
        assert!(first.is_stale());
        assert!(first.run().is_none());
    }
}
