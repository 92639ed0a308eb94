//! Expression editor engine.
//!
//! `Editor` owns the input field state and implements the editing operations
//! (insert, erase, selection moves) on top of `core_text::SplitText`, runs the
//! formatting pass through a `FormatExecutor`, and publishes `core_events`
//! events. `EditorRuntime` hosts an editor on a dedicated owner thread and
//! hands out `EditorHandle`s for everyone else.

mod command;
mod editor;
mod error;
mod highlight;
mod owner;
mod runtime;
mod settings;
mod view;

pub use command::{EditorCommand, EditorHandle};
pub use editor::Editor;
pub use error::RuntimeError;
pub use highlight::{
    BlockingPoolExecutor, FormatCompletion, FormatExecutor, FormatJob, InlineExecutor,
};
pub use runtime::{EditorRuntime, OWNER_THREAD_NAME};
pub use settings::EditorSettings;
pub use view::EditorView;
