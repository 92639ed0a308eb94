use thiserror::Error;

/// Failures surfaced by the owner-thread runtime and its handles.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("editor runtime is closed")]
    Closed,
    #[error("editor dropped the reply before answering")]
    ReplyDropped,
    #[error("failed to build editor runtime: {0}")]
    Build(#[source] std::io::Error),
    #[error("failed to spawn editor owner thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("editor owner thread panicked")]
    Panicked,
}
