mod common;

use common::{plain_editor, plain_editor_with, viewed_editor_with};
use core_state::EditorState;
use pretty_assertions::assert_eq;

#[test]
fn left_and_right_step_one_char() {
    let (mut editor, recorder) = plain_editor_with("1×2", 1);
    assert_eq!(editor.move_cursor_right().selection(), 2);
    assert_eq!(editor.move_cursor_left().selection(), 1);
    assert_eq!(editor.move_cursor_left().selection(), 0);

    let moves: Vec<usize> = recorder
        .cursor_moves()
        .iter()
        .map(|e| e.state.selection())
        .collect();
    assert_eq!(moves, vec![2, 1, 0]);
    assert!(recorder.changed().is_empty());
}

#[test]
fn moves_stop_at_bounds_without_events() {
    let (mut editor, recorder) = plain_editor_with("12", 0);
    assert_eq!(editor.move_cursor_left(), &EditorState::create("12", 0));
    editor.set_cursor_on_end();
    recorder.clear();
    assert_eq!(editor.move_cursor_right(), &EditorState::create("12", 2));
    assert!(recorder.events().is_empty());
}

#[test]
fn start_and_end_jump() {
    let (mut editor, recorder) = plain_editor_with("123+4", 2);
    assert_eq!(editor.set_cursor_on_end().selection(), 5);
    assert_eq!(editor.set_cursor_on_start().selection(), 0);
    assert_eq!(editor.set_cursor_on_start().selection(), 0);
    assert_eq!(recorder.cursor_moves().len(), 2);
}

#[test]
fn set_selection_to_current_is_idempotent() {
    let (mut editor, recorder) = plain_editor_with("123", 2);
    editor.set_selection(2);
    editor.set_selection(2);
    assert!(recorder.events().is_empty());
}

#[test]
fn set_selection_clamps_to_text() {
    let (mut editor, recorder) = plain_editor_with("123", 0);
    assert_eq!(editor.set_selection(99), &EditorState::create("123", 3));
    assert_eq!(recorder.cursor_moves().len(), 1);
}

#[test]
fn set_selection_past_end_at_end_is_a_noop() {
    let (mut editor, recorder) = plain_editor_with("123", 3);
    assert_eq!(editor.set_selection(8), &EditorState::create("123", 3));
    assert!(recorder.events().is_empty());
}

#[test]
fn move_selection_is_relative_and_clamped() {
    let (mut editor, recorder) = plain_editor_with("12345", 2);
    assert_eq!(editor.move_selection(2).selection(), 4);
    assert_eq!(editor.move_selection(-10).selection(), 0);
    recorder.clear();
    // Already at the clamped target.
    editor.move_selection(-1);
    assert!(recorder.events().is_empty());
}

#[test]
fn selection_keeps_text() {
    let (mut editor, _recorder) = plain_editor_with("1 234", 5);
    editor.move_cursor_left();
    assert_eq!(editor.state().text(), "1 234");
}

#[test]
fn selection_moves_on_empty_text_are_noops() {
    let (mut editor, recorder) = plain_editor();
    editor.move_cursor_left();
    editor.move_cursor_right();
    editor.set_cursor_on_end();
    editor.move_selection(3);
    assert!(recorder.events().is_empty());
}

#[test]
fn view_receives_selection_changes() {
    let (mut editor, view, _recorder) = viewed_editor_with("123", 3);
    editor.set_cursor_on_start();
    assert_eq!(view.last_pushed(), Some(EditorState::create("123", 0)));
    assert_eq!(view.selection_bounds(), (0, 0));
}
