mod common;

use common::{FakeView, formatting_editor, plain_editor_with, viewed_editor_with};
use core_editor::EditorView;
use core_state::EditorState;
use pretty_assertions::assert_eq;
use std::rc::Rc;

#[test]
fn attach_pushes_current_state_and_handle() {
    let (_editor, view, _recorder) = viewed_editor_with("12+3", 2);
    assert_eq!(view.pushed(), vec![EditorState::create("12+3", 2)]);
    assert_eq!(view.attached(), Some(true));
}

#[test]
fn clear_view_detaches_attached_view() {
    let (mut editor, view, _recorder) = viewed_editor_with("1", 1);
    let attached: Rc<dyn EditorView> = view.clone();
    editor.clear_view(&attached);
    assert_eq!(view.attached(), Some(false));

    editor.insert("2");
    assert_eq!(view.pushed().len(), 1, "detached view must not receive states");
}

#[test]
fn clearing_a_stale_view_is_a_noop() {
    let (mut editor, view, _recorder) = viewed_editor_with("1", 1);
    let stranger: Rc<dyn EditorView> = Rc::new(FakeView::default());
    editor.clear_view(&stranger);

    assert_eq!(view.attached(), Some(true));
    editor.insert("2");
    assert_eq!(view.last_pushed(), Some(EditorState::create("12", 2)));
}

#[test]
fn replacing_the_view_routes_updates_to_the_new_one() {
    let (mut editor, first, _recorder) = viewed_editor_with("1", 1);
    let second = Rc::new(FakeView::default());
    editor.set_view(second.clone());

    // The old view is no longer the attached one, so clearing it does nothing.
    let old: Rc<dyn EditorView> = first.clone();
    editor.clear_view(&old);

    editor.insert("2");
    assert_eq!(first.pushed().len(), 1);
    assert_eq!(second.last_pushed(), Some(EditorState::create("12", 2)));
}

#[test]
fn set_text_uses_view_selection_end() {
    let (mut editor, view, _recorder) = viewed_editor_with("", 0);
    view.select(1, 2);
    editor.set_text("345");
    assert_eq!(editor.state(), &EditorState::create("345", 2));
}

#[test]
fn set_text_without_view_puts_cursor_at_end() {
    let (mut editor, _recorder) = plain_editor_with("", 0);
    editor.set_text("3×45");
    assert_eq!(editor.state(), &EditorState::create("3×45", 4));
}

#[test]
fn view_sees_only_the_formatted_state() {
    let (mut editor, executor, _recorder) = formatting_editor();
    let view = Rc::new(FakeView::default());
    editor.set_view(view.clone());

    editor.insert("1234");
    assert_eq!(view.pushed(), vec![EditorState::empty()]);

    let done = executor.take().run().expect("current");
    editor.complete_format(done);
    assert_eq!(view.last_pushed(), Some(EditorState::create("1 234", 5)));
    assert_eq!(view.selection_bounds(), (5, 5));
}
