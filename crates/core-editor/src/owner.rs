use std::thread::{self, ThreadId};

/// Records the thread an `Editor` was built on.
///
/// `Editor` is `!Send`, so in safe code it cannot reach another thread; the
/// check still runs in debug builds on every entry point and fails fast.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OwnerThread {
    id: ThreadId,
}

impl OwnerThread {
    pub(crate) fn current() -> Self {
        Self {
            id: thread::current().id(),
        }
    }

    #[track_caller]
    pub(crate) fn check(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.id,
            "editor used off its owner thread"
        );
    }
}
