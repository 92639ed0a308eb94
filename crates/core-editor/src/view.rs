use crate::command::EditorHandle;
use core_state::EditorState;

/// Rendering collaborator for the input field.
///
/// The editor queries the selection bounds live at the start of every insert
/// or erase (never cached), pushes every accepted state through `set_state`,
/// and announces attach/detach through `set_editor`. Calls arrive on the
/// editor's owner thread.
pub trait EditorView {
    fn selection_start(&self) -> usize;
    fn selection_end(&self) -> usize;
    fn set_state(&self, state: &EditorState);
    /// `Some` when attached, `None` when detached.
    fn set_editor(&self, editor: Option<EditorHandle>);
}
